use std::collections::HashMap;
use std::sync::Arc;
use crate::domain::{build_threads, Comment, CommentId, PageUrl, Thread};
use crate::ports::{CommentGateway, RepositoryError};
use super::PendingStore;

/// The display set for a page, plus the fetch failure if the remote list
/// could not be read this round.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub comments: Vec<Comment>,
    pub fetch_error: Option<RepositoryError>,
}

/// Keep the pending comments the remote knows about but has not approved.
///
/// Anything approved remotely has its remote copy shown instead, and
/// anything the remote no longer lists was rejected or expired.
pub fn prune_pending(pending: Vec<Comment>, remote: &[Comment]) -> Vec<Comment> {
    let remote_approval: HashMap<&CommentId, bool> =
        remote.iter().map(|c| (&c.id, c.approved)).collect();

    pending
        .into_iter()
        .filter(|c| remote_approval.get(&c.id) == Some(&false))
        .collect()
}

pub struct MergeEngine {
    gateway: Arc<dyn CommentGateway>,
    pending: PendingStore,
}

impl MergeEngine {
    pub fn new(gateway: Arc<dyn CommentGateway>, pending: PendingStore) -> Self {
        Self { gateway, pending }
    }

    /// Merge the remote list for `url` with this client's pending comments,
    /// dropping pending entries that are settled remotely.
    ///
    /// A failed fetch shows pending comments only and leaves the pending
    /// record untouched, since nothing is known about their fate.
    pub async fn reconcile(&self, url: &PageUrl) -> Reconciliation {
        let (remote, fetch_error) = match self.gateway.fetch_for_page(url).await {
            Ok(remote) => (Some(remote), None),
            Err(e) => {
                tracing::warn!("Failed to fetch comments for {}: {}", url, e);
                (None, Some(e))
            }
        };

        let pending = self.pending.load(url);
        let surviving = match &remote {
            Some(remote) => {
                let before = pending.len();
                let surviving = prune_pending(pending, remote);
                if surviving.len() != before {
                    tracing::info!(
                        "Pruned {} settled pending comment(s) for {}",
                        before - surviving.len(),
                        url
                    );
                }
                surviving
            }
            None => pending,
        };

        if let Err(e) = self.pending.save(url, &surviving) {
            tracing::warn!("Failed to save pending comments for {}: {}", url, e);
        }

        let mut comments: Vec<Comment> = remote
            .unwrap_or_default()
            .into_iter()
            .filter(|c| c.approved)
            .collect();
        comments.extend(surviving);

        Reconciliation {
            comments,
            fetch_error,
        }
    }

    /// Reconcile `url` and group the result into threads.
    pub async fn threads(&self, url: &PageUrl) -> (Vec<Thread>, Option<RepositoryError>) {
        let reconciliation = self.reconcile(url).await;
        (build_threads(reconciliation.comments), reconciliation.fetch_error)
    }
}
