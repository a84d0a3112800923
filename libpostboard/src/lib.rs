//! Postboard - a client for a remote blog posts resource
//!
//! This library provides the normalized post store, the gateway to the
//! remote REST API and the asynchronous operations that feed results back
//! as lifecycle events.

pub mod config;
pub mod error;
pub mod gateway;
pub mod logging;
pub mod service;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{OperationError, PostboardError, Result};
pub use service::{Outcome, PostsService};
pub use store::{EntityStore, LoadStatus, StatusTracker};
pub use types::{Post, PostDraft, PostEdits, PostId, PostRef, ReactionKind, Reactions, UserId};
