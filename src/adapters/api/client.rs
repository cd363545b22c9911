use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use crate::ports::{RepositoryError, RepositoryResult};

pub struct CommentsApiClient {
    client: Client,
    base_url: String,
}

impl CommentsApiClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> RepositoryResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent("page-comments/0.1.0")
            .build()
            .map_err(|e| RepositoryError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> RepositoryResult<T> {
        let url = format!("{}{}{}", self.base_url, path, build_query_string(params));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        let response_text = self.handle_response(response).await?;
        serde_json::from_str(&response_text).map_err(|e| {
            RepositoryError::Serialization(format!(
                "Failed to parse response: {}. Response was: {}",
                e, response_text
            ))
        })
    }

    pub async fn post<R: Serialize>(&self, path: &str, body: &R) -> RepositoryResult<()> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| RepositoryError::Network(e.to_string()))?;

        self.handle_response(response).await.map(|_| ())
    }

    async fn handle_response(&self, response: Response) -> RepositoryResult<String> {
        let status = response.status();

        match status.as_u16() {
            200..=299 => {
                let response_text = response
                    .text()
                    .await
                    .map_err(|e| RepositoryError::Network(e.to_string()))?;

                tracing::debug!("API Response: {}", response_text);
                Ok(response_text)
            }
            404 => Err(RepositoryError::NotFound(
                "Resource not found".to_string()
            )),
            429 => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                Err(RepositoryError::RateLimit(retry_after))
            }
            _ => {
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                Err(RepositoryError::Api(format!(
                    "HTTP {}: {}",
                    status, error_text
                )))
            }
        }
    }
}

fn build_query_string(params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        return String::new();
    }

    format!(
        "?{}",
        params
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&")
    )
}
