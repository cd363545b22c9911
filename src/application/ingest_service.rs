use std::sync::Arc;
use crate::domain::CommentNode;
use crate::ports::CommentGateway;

/// Produces the comment records consumed by the static-site build.
pub struct IngestService {
    gateway: Arc<dyn CommentGateway>,
}

impl IngestService {
    pub fn new(gateway: Arc<dyn CommentGateway>) -> Self {
        Self { gateway }
    }

    /// Every remote comment as a build record. A failed fetch yields no
    /// records so the build can carry on.
    pub async fn collect_nodes(&self) -> Vec<CommentNode> {
        match self.gateway.fetch_all().await {
            Ok(comments) => {
                tracing::info!("Ingesting {} comment(s)", comments.len());
                comments.into_iter().map(CommentNode::from).collect()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch comments for ingestion: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{content_digest, Comment, PageUrl};
    use crate::ports::{MockCommentGateway, RepositoryError};
    use chrono::Utc;

    #[tokio::test]
    async fn builds_one_node_per_comment() {
        let comment = Comment {
            id: "7".into(),
            name: "Alice".to_string(),
            text: "<p>Nice</p>".to_string(),
            created_at: Utc::now(),
            url: PageUrl::normalize("/wiki/solid"),
            approved: false,
            parent_comment_id: None,
        };
        let expected_digest = content_digest(&comment);

        let mut gateway = MockCommentGateway::new();
        gateway
            .expect_fetch_all()
            .times(1)
            .returning(move || Ok(vec![comment.clone()]));

        let nodes = IngestService::new(Arc::new(gateway)).collect_nodes().await;
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, "7".into());
        assert_eq!(nodes[0].content_digest, expected_digest);
    }

    #[tokio::test]
    async fn fetch_failure_yields_nothing() {
        let mut gateway = MockCommentGateway::new();
        gateway
            .expect_fetch_all()
            .returning(|| Err(RepositoryError::RateLimit(60)));

        let nodes = IngestService::new(Arc::new(gateway)).collect_nodes().await;
        assert!(nodes.is_empty());
    }
}
