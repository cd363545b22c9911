use async_trait::async_trait;
use crate::domain::{Comment, PageUrl};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limited: retry after {0} seconds")]
    RateLimit(u64),

    #[error("API error: {0}")]
    Api(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// The remote moderation authority for comments.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Every comment the remote knows for the page, approved or not.
    async fn fetch_for_page(&self, url: &PageUrl) -> RepositoryResult<Vec<Comment>>;

    /// Every comment for every page.
    async fn fetch_all(&self) -> RepositoryResult<Vec<Comment>>;

    /// Store a new, unapproved comment pending moderation.
    async fn submit(&self, comment: &Comment) -> RepositoryResult<()>;
}
