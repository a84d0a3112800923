//! Application state
//!
//! All state transitions happen through the reducer (see `reducer.rs`).

use libpostboard::store::{EntityStore, LoadStatus, StatusTracker};
use libpostboard::types::{newest_first, Post};

/// Root application state
///
/// This is the single source of truth for the client. It is owned by the
/// dispatcher for the whole session and only ever replaced by the reducer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub posts: PostsState,
}

/// Normalized post collection plus the load lifecycle of fetch-all
#[derive(Debug, Clone, PartialEq)]
pub struct PostsState {
    /// Posts keyed by id, ordered newest first
    pub entities: EntityStore<Post>,

    /// Status and last error of the collection-level fetch
    pub load: StatusTracker,
}

impl Default for PostsState {
    fn default() -> Self {
        Self {
            entities: EntityStore::new(newest_first),
            load: StatusTracker::default(),
        }
    }
}

impl AppState {
    /// Create new application state with no posts and an idle fetch
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> LoadStatus {
        self.posts.load.status()
    }
}
