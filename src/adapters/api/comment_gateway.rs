use async_trait::async_trait;
use super::{CommentCreateDto, CommentListResponse, CommentsApiClient};
use crate::{
    domain::{Comment, PageUrl},
    ports::{CommentGateway, RepositoryResult},
};

pub struct HttpCommentGateway {
    client: CommentsApiClient,
}

impl HttpCommentGateway {
    pub fn new(client: CommentsApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentGateway for HttpCommentGateway {
    async fn fetch_for_page(&self, url: &PageUrl) -> RepositoryResult<Vec<Comment>> {
        tracing::debug!("Fetching comments for {} from {}", url, self.client.base_url());

        let response: CommentListResponse = self
            .client
            .get("/comments", &[("url", url.as_str())])
            .await?;
        Ok(response.into_comments())
    }

    async fn fetch_all(&self) -> RepositoryResult<Vec<Comment>> {
        tracing::debug!("Fetching all comments from {}", self.client.base_url());

        let response: CommentListResponse = self.client.get("/comments", &[]).await?;
        Ok(response.into_comments())
    }

    async fn submit(&self, comment: &Comment) -> RepositoryResult<()> {
        let body = CommentCreateDto::from(comment);
        self.client.post("/comments", &body).await
    }
}
