use crate::domain::{Comment, Thread};

/// Convert sanitized comment HTML to markdown for terminal output
pub fn html_to_markdown(html: &str) -> String {
    if html.trim().is_empty() {
        return String::new();
    }

    match htmd::convert(html) {
        Ok(markdown) => markdown.trim().to_string(),
        Err(e) => {
            // Fallback to original HTML if conversion fails
            tracing::warn!("Failed to convert comment HTML: {}", e);
            html.to_string()
        }
    }
}

fn render_comment(comment: &Comment, indent: &str, out: &mut String) {
    out.push_str(indent);
    out.push_str(&comment.name);
    out.push_str(" · ");
    out.push_str(&comment.time_since_created());
    if let Some(label) = comment.approval_label() {
        out.push_str(" · ");
        out.push_str(label);
    }
    out.push('\n');

    for line in html_to_markdown(&comment.text).lines() {
        out.push_str(indent);
        out.push_str("  ");
        out.push_str(line);
        out.push('\n');
    }
}

pub fn render_threads(threads: &[Thread]) -> String {
    if threads.is_empty() {
        return "No comments yet.\n".to_string();
    }

    let mut out = String::new();
    for (i, thread) in threads.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        render_comment(&thread.root, "", &mut out);
        for reply in &thread.replies {
            render_comment(reply, "    ", &mut out);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PageUrl;
    use chrono::Utc;

    fn comment(id: &str, name: &str, text: &str, approved: bool) -> Comment {
        Comment {
            id: id.into(),
            name: name.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
            url: PageUrl::normalize("/articles/ddd"),
            approved,
            parent_comment_id: None,
        }
    }

    #[test]
    fn converts_basic_markup() {
        assert_eq!(html_to_markdown("<p>Hello <strong>there</strong></p>"), "Hello **there**");
        assert_eq!(html_to_markdown("   "), "");
    }

    #[test]
    fn renders_replies_indented_and_marks_pending() {
        let threads = vec![Thread {
            root: comment("1", "Alice", "<p>Root comment</p>", true),
            replies: vec![comment("2", "Bob", "<p>A reply</p>", false)],
        }];

        let rendered = render_threads(&threads);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Alice · Just now");
        assert_eq!(lines[1], "  Root comment");
        assert_eq!(lines[2], "    Bob · Just now · Awaiting approval");
        assert_eq!(lines[3], "      A reply");
    }

    #[test]
    fn empty_thread_list() {
        assert_eq!(render_threads(&[]), "No comments yet.\n");
    }
}
