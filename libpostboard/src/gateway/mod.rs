//! Remote gateway abstraction and implementations
//!
//! A gateway performs the four HTTP calls the post operations need against a
//! single base resource URL. Gateways surface transport failures and
//! non-success statuses as `OperationError` values and never retry.
//!
//! # Examples
//!
//! ```no_run
//! use libpostboard::gateway::{PostsGateway, http::HttpGateway};
//!
//! # async fn example() -> Result<(), libpostboard::error::OperationError> {
//! let gateway = HttpGateway::new("https://jsonplaceholder.typicode.com/posts")?;
//!
//! let posts = gateway.list_posts().await?;
//! println!("Fetched {} posts", posts.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::OperationError;
use crate::types::{PostDraft, PostEdits, PostId, RawPost};

pub mod http;

// Mock gateway is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Result type for gateway calls
pub type GatewayResult<T> = std::result::Result<T, OperationError>;

/// The remote posts resource
#[async_trait]
pub trait PostsGateway: Send + Sync {
    /// GET the whole collection
    async fn list_posts(&self) -> GatewayResult<Vec<RawPost>>;

    /// POST a new post; the server assigns the id
    async fn create_post(&self, draft: &PostDraft) -> GatewayResult<RawPost>;

    /// PUT `{base}/{id}`
    async fn update_post(&self, id: PostId, edits: &PostEdits) -> GatewayResult<RawPost>;

    /// DELETE `{base}/{id}`
    ///
    /// Returns the HTTP status of a successful (2xx) response.
    async fn delete_post(&self, id: PostId) -> GatewayResult<u16>;

    /// Base resource URL, for logging
    fn base_url(&self) -> &str;
}
