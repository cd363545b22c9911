use clap::{Arg, ArgAction, ArgMatches, Command};
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;

mod adapters;
mod application;
mod domain;
mod ports;

use adapters::{
    api::{CommentsApiClient, HttpCommentGateway},
    cli::render_threads,
    config::FileConfigStore,
    storage::{FileKeyValueStore, MemoryKeyValueStore},
};
use application::{
    AppResult, IngestService, MergeEngine, PendingStore, SubmissionController, SubmissionOutcome,
};
use domain::PageUrl;
use ports::{AppConfig, CommentGateway, ConfigStore, KeyValueStore};

fn cli() -> Command {
    let path_arg = || {
        Arg::new("path")
            .help("Page path the comments belong to, e.g. /articles/ddd-intro/")
            .required(true)
            .index(1)
    };

    Command::new("page-comments")
        .version("0.1.0")
        .about("Read and post moderated page comments")
        .long_about("Read and post moderated page comments.\n\nComments you post are remembered locally until the site approves or rejects them.")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .value_name("URL")
                .help("Comments API base URL (can also be set via COMMENTS_API_URL env var)")
                .global(true)
        )
        .arg(
            Arg::new("dev")
                .long("dev")
                .help("Use the local development API")
                .action(ArgAction::SetTrue)
                .global(true)
        )
        .arg(
            Arg::new("storage")
                .long("storage")
                .value_name("FILE")
                .help("File holding locally remembered comments")
                .value_parser(clap::value_parser!(PathBuf))
                .global(true)
        )
        .arg(
            Arg::new("ephemeral")
                .long("ephemeral")
                .help("Forget submitted comments when the command exits")
                .action(ArgAction::SetTrue)
                .global(true)
        )
        .subcommand(
            Command::new("threads")
                .about("Show the comment threads for a page")
                .arg(path_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print threads as JSON")
                        .action(ArgAction::SetTrue)
                )
        )
        .subcommand(
            Command::new("submit")
                .about("Post a comment on a page")
                .arg(path_arg())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .short('n')
                        .value_name("NAME")
                        .help("Display name")
                        .required(true)
                )
                .arg(
                    Arg::new("text")
                        .long("text")
                        .short('t')
                        .value_name("TEXT")
                        .help("Comment body, HTML allowed")
                        .required(true)
                )
                .arg(
                    Arg::new("reply-to")
                        .long("reply-to")
                        .value_name("COMMENT_ID")
                        .help("Id of the comment being replied to")
                )
        )
        .subcommand(
            Command::new("pending")
                .about("List your comments still awaiting approval on a page")
                .arg(path_arg())
        )
        .subcommand(
            Command::new("export")
                .about("Print every comment as build records with content digests")
        )
}

fn page_from(matches: &ArgMatches) -> PageUrl {
    matches
        .get_one::<String>("path")
        .map(|path| PageUrl::normalize(path))
        .unwrap_or_else(|| PageUrl::normalize("/"))
}

fn open_gateway(config: &AppConfig) -> AppResult<Arc<dyn CommentGateway>> {
    let api_client = CommentsApiClient::new(&config.api_url, config.request_timeout_seconds)?;
    Ok(Arc::new(HttpCommentGateway::new(api_client)))
}

fn open_storage(config: &AppConfig, ephemeral: bool) -> AppResult<Arc<dyn KeyValueStore>> {
    if ephemeral {
        return Ok(Arc::new(MemoryKeyValueStore::new()));
    }

    let store = match &config.storage_path {
        Some(path) => FileKeyValueStore::new(path.clone()),
        None => FileKeyValueStore::in_data_dir()?,
    };
    tracing::debug!("Pending comments stored in {}", store.path().display());
    Ok(Arc::new(store))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize color-eyre for better error reporting
    color_eyre::install()?;

    // Log to a file, stdout carries command output
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("page-comments.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let matches = cli().get_matches();

    // Load configuration
    let config_store = FileConfigStore::new()?;
    let mut config = config_store.load_config().await?;

    // Explicit values are remembered, --dev only applies to this run
    let mut save_config = false;
    if let Some(api_url) = matches.get_one::<String>("api-url") {
        config.api_url = api_url.clone();
        save_config = true;
    }
    if let Some(storage) = matches.get_one::<PathBuf>("storage") {
        config.storage_path = Some(storage.clone());
        save_config = true;
    }
    if save_config {
        config_store.save_config(&config).await?;
    }
    if matches.get_flag("dev") {
        config.use_development_api();
    }

    tracing::info!("Using comments API at {}", config.api_url);

    // Create dependencies
    let gateway = open_gateway(&config)?;
    let pending = PendingStore::new(open_storage(&config, matches.get_flag("ephemeral"))?);
    let merge_engine = Arc::new(MergeEngine::new(gateway.clone(), pending.clone()));

    match matches.subcommand() {
        Some(("threads", threads_matches)) => {
            let page = page_from(threads_matches);
            let (threads, fetch_error) = merge_engine.threads(&page).await;

            if let Some(e) = &fetch_error {
                eprintln!("⚠️  Could not load comments from the site: {e}");
                eprintln!("   Showing only your comments awaiting approval.");
            }

            if threads_matches.get_flag("json") {
                println!("{}", serde_json::to_string_pretty(&threads)?);
            } else {
                print!("{}", render_threads(&threads));
            }
        }
        Some(("submit", submit_matches)) => {
            let page = page_from(submit_matches);
            let mut controller = SubmissionController::new(
                gateway.clone(),
                merge_engine.clone(),
                pending.clone(),
                page,
            );

            if let Some(e) = controller.refresh().await {
                tracing::warn!("Submitting without current comments: {}", e);
            }

            let form = controller.form_mut();
            if let Some(name) = submit_matches.get_one::<String>("name") {
                form.name = name.clone();
            }
            if let Some(text) = submit_matches.get_one::<String>("text") {
                form.text = text.clone();
            }
            form.reply_to = submit_matches
                .get_one::<String>("reply-to")
                .map(|id| id.as_str().into());

            let outcome = controller.submit().await;
            tracing::debug!(
                "Submission settled in {:?}, {} comment(s) on display",
                controller.state(),
                controller.comments().len()
            );

            match outcome {
                SubmissionOutcome::Confirmed(comment) => {
                    println!(
                        "✅ Comment {} posted on {}, awaiting approval",
                        comment.id,
                        controller.page()
                    );
                    println!();
                    print!("{}", render_threads(&controller.threads()));
                }
                SubmissionOutcome::Rejected(reason) => {
                    eprintln!("❌ {reason}");
                    std::process::exit(1);
                }
                SubmissionOutcome::Failed { error, .. } => {
                    eprintln!("❌ Your comment could not be posted: {error}");
                    eprintln!("   Nothing was saved, please try again.");
                    std::process::exit(1);
                }
            }
        }
        Some(("pending", pending_matches)) => {
            let page = page_from(pending_matches);
            let comments = pending.load(&page);
            println!("{}", serde_json::to_string_pretty(&comments)?);
        }
        Some(("export", _)) => {
            let nodes = IngestService::new(gateway.clone()).collect_nodes().await;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
        }
        _ => {
            eprintln!("❌ Unknown command");
            std::process::exit(1);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn parses_submit() {
        let matches = cli()
            .try_get_matches_from([
                "page-comments",
                "submit",
                "/articles/ddd/",
                "--name",
                "Bob",
                "--text",
                "Great write-up, thanks for sharing!",
                "--reply-to",
                "42",
                "--dev",
            ])
            .unwrap();

        assert!(matches.get_flag("dev"));
        let (name, submit) = matches.subcommand().unwrap();
        assert_eq!(name, "submit");
        assert_eq!(page_from(submit).as_str(), "/articles/ddd");
        assert_eq!(submit.get_one::<String>("reply-to").map(String::as_str), Some("42"));
    }
}
