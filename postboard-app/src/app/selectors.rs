//! Read-side queries over `AppState`
//!
//! Plain selectors borrow straight from the store. `PostsByUser` is the one
//! derived query worth caching: it filters the whole collection, so it keeps
//! its last result and recomputes only when the store revision or the
//! requested user changes.

use std::sync::Arc;

use libpostboard::store::LoadStatus;
use libpostboard::types::{Post, PostId, UserId};

use super::state::AppState;

/// Every post, newest first
pub fn select_all_posts(state: &AppState) -> Vec<&Post> {
    state.posts.entities.all().collect()
}

pub fn select_post_by_id(state: &AppState, id: PostId) -> Option<&Post> {
    state.posts.entities.get(id)
}

/// Post ids in display order
pub fn select_post_ids(state: &AppState) -> &[PostId] {
    state.posts.entities.ids()
}

pub fn select_posts_status(state: &AppState) -> LoadStatus {
    state.posts.load.status()
}

pub fn select_posts_error(state: &AppState) -> Option<&str> {
    state.posts.load.error()
}

/// Memoized "posts by author" query
#[derive(Debug, Default)]
pub struct PostsByUser {
    cached: Option<CachedPosts>,
    recomputations: usize,
}

#[derive(Debug)]
struct CachedPosts {
    revision: u64,
    user_id: UserId,
    posts: Arc<Vec<Post>>,
}

impl PostsByUser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Posts written by `user_id`, newest first.
    ///
    /// Returns the previous `Arc` untouched while neither the store nor the
    /// user has changed, so callers can compare results with `Arc::ptr_eq`.
    pub fn select(&mut self, state: &AppState, user_id: UserId) -> Arc<Vec<Post>> {
        let revision = state.posts.entities.revision();

        if let Some(cached) = &self.cached {
            if cached.revision == revision && cached.user_id == user_id {
                return Arc::clone(&cached.posts);
            }
        }

        let posts: Arc<Vec<Post>> = Arc::new(
            state
                .posts
                .entities
                .all()
                .filter(|post| post.user_id == Some(user_id))
                .cloned()
                .collect(),
        );
        self.recomputations += 1;
        self.cached = Some(CachedPosts {
            revision,
            user_id,
            posts: Arc::clone(&posts),
        });
        posts
    }

    /// How many times the filter actually ran
    pub fn recomputations(&self) -> usize {
        self.recomputations
    }
}
