//! HTTP gateway backed by reqwest

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};

use crate::config::ApiConfig;
use crate::error::OperationError;
use crate::gateway::{GatewayResult, PostsGateway};
use crate::types::{PostDraft, PostEdits, PostId, RawPost};

const DEFAULT_USER_AGENT: &str = concat!("postboard/", env!("CARGO_PKG_VERSION"));

/// Gateway talking JSON to a REST posts resource
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    /// Create a gateway for `base_url` with no request timeout
    pub fn new(base_url: impl Into<String>) -> GatewayResult<Self> {
        Self::build(base_url.into(), None, None)
    }

    /// Create a gateway from the `[api]` configuration section
    pub fn from_config(config: &ApiConfig) -> GatewayResult<Self> {
        Self::build(
            config.base_url.clone(),
            config.timeout_secs.map(Duration::from_secs),
            config.user_agent.clone(),
        )
    }

    fn build(
        base_url: String,
        timeout: Option<Duration>,
        user_agent: Option<String>,
    ) -> GatewayResult<Self> {
        let mut builder = Client::builder()
            .user_agent(user_agent.unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| OperationError::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL of a single post
    pub fn item_url(&self, id: PostId) -> String {
        format!("{}/{}", self.base_url, id)
    }
}

/// Turn non-2xx responses into `OperationError::Http`
fn check_status(response: Response) -> GatewayResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(OperationError::Http {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("unknown").to_string(),
        })
    }
}

#[async_trait]
impl PostsGateway for HttpGateway {
    async fn list_posts(&self) -> GatewayResult<Vec<RawPost>> {
        tracing::debug!(url = %self.base_url, "GET posts");
        let response = self.client.get(&self.base_url).send().await?;
        let posts = check_status(response)?.json::<Vec<RawPost>>().await?;
        Ok(posts)
    }

    async fn create_post(&self, draft: &PostDraft) -> GatewayResult<RawPost> {
        tracing::debug!(url = %self.base_url, "POST post");
        let response = self.client.post(&self.base_url).json(draft).send().await?;
        let post = check_status(response)?.json::<RawPost>().await?;
        Ok(post)
    }

    async fn update_post(&self, id: PostId, edits: &PostEdits) -> GatewayResult<RawPost> {
        let url = self.item_url(id);
        tracing::debug!(url = %url, "PUT post");
        let response = self.client.put(&url).json(edits).send().await?;
        let post = check_status(response)?.json::<RawPost>().await?;
        Ok(post)
    }

    async fn delete_post(&self, id: PostId) -> GatewayResult<u16> {
        let url = self.item_url(id);
        tracing::debug!(url = %url, "DELETE post");
        let response = self.client.delete(&url).send().await?;
        Ok(check_status(response)?.status().as_u16())
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }
}
