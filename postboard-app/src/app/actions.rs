//! Actions for the reducer pattern
//!
//! All state transitions are triggered by actions: the one synchronous
//! action a user can dispatch directly, and the lifecycle events produced by
//! the asynchronous post operations.

use libpostboard::service::events::PostsEvent;
use libpostboard::PostId;

/// Actions that trigger state transitions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Add one reaction to a post.
    ///
    /// The reaction arrives by name; names outside the fixed reaction set
    /// are ignored by the reducer.
    ReactionAdded { post_id: PostId, reaction: String },

    /// Lifecycle event from a post operation
    Posts(PostsEvent),
}

impl Action {
    pub fn reaction_added(post_id: PostId, reaction: impl Into<String>) -> Self {
        Action::ReactionAdded {
            post_id,
            reaction: reaction.into(),
        }
    }

    /// Action type in `posts/...` form, used in logs
    pub fn type_name(&self) -> String {
        match self {
            Action::ReactionAdded { .. } => "posts/reactionAdded".to_string(),
            Action::Posts(event) => event.type_name(),
        }
    }
}

impl From<PostsEvent> for Action {
    fn from(event: PostsEvent) -> Self {
        Action::Posts(event)
    }
}
