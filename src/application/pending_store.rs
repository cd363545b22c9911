use std::sync::Arc;
use crate::domain::{Comment, PageUrl};
use crate::ports::{KeyValueStore, StorageError, StorageResult};

const KEY_PREFIX: &str = "submitted-comments/";

/// This client's submitted comments that are not yet approved, one record
/// per page.
///
/// Each operation reads storage afresh, so two holders of the same store
/// never act on a stale copy.
#[derive(Clone)]
pub struct PendingStore {
    storage: Arc<dyn KeyValueStore>,
}

impl PendingStore {
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        Self { storage }
    }

    pub fn storage_key(url: &PageUrl) -> String {
        format!("{KEY_PREFIX}{url}")
    }

    /// Pending comments for `url`. Missing or unreadable records are empty.
    pub fn load(&self, url: &PageUrl) -> Vec<Comment> {
        let key = Self::storage_key(url);

        let raw = match self.storage.get(&key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("Failed to read pending comments for {}: {}", url, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt pending comments for {}: {}", url, e);
            Vec::new()
        })
    }

    /// Replace the whole record for `url`. An empty set removes the record.
    pub fn save(&self, url: &PageUrl, comments: &[Comment]) -> StorageResult<()> {
        let key = Self::storage_key(url);
        if comments.is_empty() {
            return self.storage.remove(&key);
        }

        let raw = serde_json::to_string(comments)
            .map_err(|e| StorageError::WriteError(e.to_string()))?;
        self.storage.set(&key, &raw)
    }

    /// Add `comment` to its page's record unless one with the same id is
    /// already there.
    pub fn append(&self, comment: &Comment) -> StorageResult<()> {
        let mut comments = self.load(&comment.url);

        if comments.iter().any(|c| c.id == comment.id) {
            tracing::debug!("Comment {} already pending, not appending", comment.id);
            return Ok(());
        }

        comments.push(comment.clone());
        self.save(&comment.url, &comments)
    }
}
