//! Asynchronous post operations
//!
//! `PostsService` wraps the gateway calls behind the four operations the
//! client needs: fetch all, create, update and delete. Each invocation
//!
//! 1. emits a `Pending` event synchronously, before any I/O,
//! 2. performs exactly one gateway call (no retries),
//! 3. emits `Fulfilled` or `Rejected` onto the event queue, and
//! 4. resolves to an `Outcome` telling the caller what happened.
//!
//! The service never touches application state: the consumer of the event
//! queue is the only writer.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use libpostboard::gateway::http::HttpGateway;
//! use libpostboard::service::{events::event_queue, PostsService};
//!
//! # async fn example() -> Result<(), libpostboard::error::OperationError> {
//! let gateway = HttpGateway::new("https://jsonplaceholder.typicode.com/posts")?;
//! let (sender, receiver) = event_queue();
//! let service = PostsService::new(Arc::new(gateway), sender);
//!
//! let outcome = service.fetch_posts().await;
//! println!("fetch: {:?}, {} events queued", outcome, receiver.len());
//! # Ok(())
//! # }
//! ```

pub mod events;

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use uuid::Uuid;

use self::events::{EventSender, Lifecycle, PostsEvent, UpdateOutcome};
use crate::error::OperationError;
use crate::gateway::PostsGateway;
use crate::types::{PostDraft, PostEdits, PostRef, ReceivedPost};

/// Status a delete must answer with to count as done
pub const DELETE_SUCCESS_STATUS: u16 = 200;

/// What an operation did, as reported to its caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Server confirmed; the fulfilled event carries the server's answer
    Applied,
    /// Server call failed; the caller's own payload was fulfilled instead
    AppliedOptimistically(OperationError),
    /// Nothing will change in the store
    Rejected(OperationError),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        !matches!(self, Outcome::Rejected(_))
    }

    pub fn error(&self) -> Option<&OperationError> {
        match self {
            Outcome::Applied => None,
            Outcome::AppliedOptimistically(e) | Outcome::Rejected(e) => Some(e),
        }
    }
}

/// Future returned by every operation
pub type OperationFuture = BoxFuture<'static, Outcome>;

/// Post operations over a gateway
#[derive(Clone)]
pub struct PostsService {
    gateway: Arc<dyn PostsGateway>,
    events: EventSender,
}

impl PostsService {
    pub fn new(gateway: Arc<dyn PostsGateway>, events: EventSender) -> Self {
        Self { gateway, events }
    }

    pub fn gateway(&self) -> &Arc<dyn PostsGateway> {
        &self.gateway
    }

    /// Load the whole collection
    pub fn fetch_posts(&self) -> OperationFuture {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, url = self.gateway.base_url(), "Fetching posts");
        self.events
            .emit(PostsEvent::FetchPosts(Lifecycle::pending(request_id)));

        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        async move {
            match gateway.list_posts().await {
                Ok(raw_posts) => {
                    let total = raw_posts.len();
                    let posts: Vec<ReceivedPost> = raw_posts
                        .into_iter()
                        .filter_map(|raw| match ReceivedPost::try_from(raw) {
                            Ok(post) => Some(post),
                            Err(e) => {
                                tracing::warn!(%request_id, error = %e, "Skipping fetched post");
                                None
                            }
                        })
                        .collect();
                    tracing::info!(%request_id, loaded = posts.len(), total, "Fetched posts");
                    events.emit(PostsEvent::FetchPosts(Lifecycle::fulfilled(request_id, posts)));
                    Outcome::Applied
                }
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "Fetching posts failed");
                    events.emit(PostsEvent::FetchPosts(Lifecycle::rejected(request_id, e.clone())));
                    Outcome::Rejected(e)
                }
            }
        }
        .boxed()
    }

    /// Create a post. The server's answer must carry an id and an author
    /// that coerces to an integer, otherwise the create is rejected.
    pub fn add_new_post(&self, draft: PostDraft) -> OperationFuture {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, title = %draft.title, "Creating post");
        self.events
            .emit(PostsEvent::AddNewPost(Lifecycle::pending(request_id)));

        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        async move {
            let result = gateway
                .create_post(&draft)
                .await
                .and_then(ReceivedPost::try_from);

            match result {
                Ok(post) => {
                    tracing::info!(%request_id, post_id = post.id, "Created post");
                    events.emit(PostsEvent::AddNewPost(Lifecycle::fulfilled(request_id, post)));
                    Outcome::Applied
                }
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "Creating post failed");
                    events.emit(PostsEvent::AddNewPost(Lifecycle::rejected(request_id, e.clone())));
                    Outcome::Rejected(e)
                }
            }
        }
        .boxed()
    }

    /// Update a post.
    ///
    /// When the server call fails the edits are still fulfilled, unconfirmed,
    /// so the change shows locally. Edits without a usable id, or with a
    /// `userId` that is not an integer, are rejected before any request is
    /// made; a fulfilled update always produces a post in the store.
    pub fn update_post(&self, edits: PostEdits) -> OperationFuture {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, post_id = edits.id, "Updating post");
        self.events
            .emit(PostsEvent::UpdatePost(Lifecycle::pending(request_id)));

        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        async move {
            let edits = match edits.normalized() {
                Ok(edits) => edits,
                Err(e) => {
                    tracing::warn!(%request_id, error = %e, "Update not sent");
                    events.emit(PostsEvent::UpdatePost(Lifecycle::rejected(request_id, e.clone())));
                    return Outcome::Rejected(e);
                }
            };

            match gateway.update_post(edits.id, &edits).await {
                Ok(raw) => match PostEdits::try_from(raw) {
                    Ok(confirmed) => {
                        tracing::info!(%request_id, post_id = confirmed.id, "Updated post");
                        let outcome = UpdateOutcome {
                            edits: confirmed,
                            confirmed: true,
                        };
                        events.emit(PostsEvent::UpdatePost(Lifecycle::fulfilled(request_id, outcome)));
                        Outcome::Applied
                    }
                    Err(e) => {
                        tracing::warn!(%request_id, error = %e, "Update response unusable");
                        events.emit(PostsEvent::UpdatePost(Lifecycle::rejected(request_id, e.clone())));
                        Outcome::Rejected(e)
                    }
                },
                Err(e) => {
                    tracing::warn!(
                        %request_id,
                        post_id = edits.id,
                        error = %e,
                        "Update failed, applying edits locally"
                    );
                    let outcome = UpdateOutcome {
                        edits,
                        confirmed: false,
                    };
                    events.emit(PostsEvent::UpdatePost(Lifecycle::fulfilled(request_id, outcome)));
                    Outcome::AppliedOptimistically(e)
                }
            }
        }
        .boxed()
    }

    /// Delete a post. Only an answer of exactly `DELETE_SUCCESS_STATUS`
    /// counts; anything else leaves the post in place.
    pub fn delete_post(&self, post_ref: PostRef) -> OperationFuture {
        let request_id = Uuid::new_v4();
        tracing::debug!(%request_id, post_id = post_ref.id, "Deleting post");
        self.events
            .emit(PostsEvent::DeletePost(Lifecycle::pending(request_id)));

        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        async move {
            let result = if post_ref.id > 0 {
                gateway.delete_post(post_ref.id).await.and_then(|status| {
                    if status == DELETE_SUCCESS_STATUS {
                        Ok(())
                    } else {
                        Err(OperationError::Http {
                            status,
                            reason: format!("expected status {}", DELETE_SUCCESS_STATUS),
                        })
                    }
                })
            } else {
                Err(OperationError::Malformed(format!(
                    "cannot delete post with id {}",
                    post_ref.id
                )))
            };

            match result {
                Ok(()) => {
                    tracing::info!(%request_id, post_id = post_ref.id, "Deleted post");
                    events.emit(PostsEvent::DeletePost(Lifecycle::fulfilled(request_id, post_ref)));
                    Outcome::Applied
                }
                Err(e) => {
                    tracing::warn!(%request_id, post_id = post_ref.id, error = %e, "Delete not completed");
                    events.emit(PostsEvent::DeletePost(Lifecycle::rejected(request_id, e.clone())));
                    Outcome::Rejected(e)
                }
            }
        }
        .boxed()
    }
}
