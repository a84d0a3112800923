//! Synchronous front end over the async post operations
//!
//! `Dispatcher` owns the application state, the tokio runtime the operations
//! run on, and the single consumer end of the event queue. Operations are
//! spawned onto the runtime; their lifecycle events are folded into the state
//! by `process_events`, one at a time and in the order they were emitted.
//! That makes the dispatcher the only writer of `AppState`.
//!
//! # Example
//!
//! ```no_run
//! use postboard_app::dispatcher::Dispatcher;
//!
//! # fn example() -> postboard_app::error::Result<()> {
//! let config = libpostboard::Config::load()?;
//! let mut dispatcher = Dispatcher::from_config(&config)?;
//!
//! dispatcher.fetch_posts();
//! for post in dispatcher.all_posts() {
//!     println!("{} {}", post.id, post.title);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! State only changes through `react` and the four post operations. Raw
//! actions cannot be dispatched from outside:
//!
//! ```compile_fail
//! use std::sync::Arc;
//! use libpostboard::gateway::mock::MockGateway;
//! use postboard_app::{Action, Dispatcher};
//!
//! let mut dispatcher = Dispatcher::new(Arc::new(MockGateway::new())).unwrap();
//! dispatcher.dispatch(Action::reaction_added(1, "wow"));
//! ```

use std::sync::Arc;
use std::time::Duration;

use libpostboard::gateway::http::HttpGateway;
use libpostboard::gateway::PostsGateway;
use libpostboard::service::events::{event_queue, EventReceiver};
use libpostboard::service::{OperationFuture, Outcome, PostsService};
use libpostboard::store::LoadStatus;
use libpostboard::types::{Post, PostDraft, PostEdits, PostId, PostRef, UserId};
use libpostboard::{Config, OperationError};
use tokio::runtime::Runtime;
use tokio::task::JoinHandle;

use crate::app::selectors::{self, PostsByUser};
use crate::app::{reduce, Action, AppState};
use crate::error::Result;

/// Handle to a spawned operation.
///
/// Dropping it does not cancel the operation: its events still reach the
/// store when it settles.
pub type OperationHandle = JoinHandle<Outcome>;

pub struct Dispatcher {
    state: AppState,
    posts_by_user: PostsByUser,
    service: PostsService,
    events: EventReceiver,
    runtime: Runtime,
}

impl Dispatcher {
    /// Create a dispatcher over any gateway
    ///
    /// # Errors
    ///
    /// Returns an error if the tokio runtime cannot be created.
    pub fn new(gateway: Arc<dyn PostsGateway>) -> Result<Self> {
        let runtime = Runtime::new()?;
        let (sender, receiver) = event_queue();

        Ok(Self {
            state: AppState::new(),
            posts_by_user: PostsByUser::new(),
            service: PostsService::new(gateway, sender),
            events: receiver,
            runtime,
        })
    }

    /// Create a dispatcher talking HTTP to the configured API
    pub fn from_config(config: &Config) -> Result<Self> {
        let gateway = HttpGateway::from_config(&config.api)?;
        tracing::debug!("Using API at {}", gateway.base_url());
        Self::new(Arc::new(gateway))
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn service(&self) -> &PostsService {
        &self.service
    }

    /// Run one action through the reducer
    fn dispatch(&mut self, action: Action) {
        tracing::trace!("Dispatching {}", action.type_name());
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, action);
    }

    /// Add a reaction to a post by reaction name
    pub fn react(&mut self, post_id: PostId, reaction: &str) {
        self.dispatch(Action::reaction_added(post_id, reaction));
    }

    /// Apply every event already on the queue. Returns how many were applied.
    pub fn process_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            self.dispatch(event.into());
            applied += 1;
        }
        applied
    }

    /// Block until an event arrives or `timeout` passes, then apply whatever
    /// is queued. Returns false on timeout.
    pub fn wait_for_event(&mut self, timeout: Duration) -> bool {
        match self.events.recv_timeout(timeout) {
            Ok(event) => {
                self.dispatch(event.into());
                self.process_events();
                true
            }
            Err(_) => false,
        }
    }

    fn spawn(&mut self, operation: OperationFuture) -> OperationHandle {
        // Pending was queued when the operation was created
        self.process_events();
        self.runtime.spawn(operation)
    }

    pub fn spawn_fetch_posts(&mut self) -> OperationHandle {
        let operation = self.service.fetch_posts();
        self.spawn(operation)
    }

    pub fn spawn_add_new_post(&mut self, draft: PostDraft) -> OperationHandle {
        let operation = self.service.add_new_post(draft);
        self.spawn(operation)
    }

    pub fn spawn_update_post(&mut self, edits: PostEdits) -> OperationHandle {
        let operation = self.service.update_post(edits);
        self.spawn(operation)
    }

    pub fn spawn_delete_post(&mut self, post_ref: PostRef) -> OperationHandle {
        let operation = self.service.delete_post(post_ref);
        self.spawn(operation)
    }

    /// Block on a spawned operation, then apply the events it produced
    pub fn wait(&mut self, handle: OperationHandle) -> Outcome {
        let outcome = match self.runtime.block_on(handle) {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Operation task failed: {}", e);
                Outcome::Rejected(OperationError::Network(e.to_string()))
            }
        };
        self.process_events();
        outcome
    }

    pub fn fetch_posts(&mut self) -> Outcome {
        let handle = self.spawn_fetch_posts();
        self.wait(handle)
    }

    pub fn add_new_post(&mut self, draft: PostDraft) -> Outcome {
        let handle = self.spawn_add_new_post(draft);
        self.wait(handle)
    }

    pub fn update_post(&mut self, edits: PostEdits) -> Outcome {
        let handle = self.spawn_update_post(edits);
        self.wait(handle)
    }

    pub fn delete_post(&mut self, post_ref: PostRef) -> Outcome {
        let handle = self.spawn_delete_post(post_ref);
        self.wait(handle)
    }

    // Selectors

    pub fn all_posts(&self) -> Vec<&Post> {
        selectors::select_all_posts(&self.state)
    }

    pub fn post(&self, id: PostId) -> Option<&Post> {
        selectors::select_post_by_id(&self.state, id)
    }

    pub fn post_ids(&self) -> &[PostId] {
        selectors::select_post_ids(&self.state)
    }

    pub fn posts_by_user(&mut self, user_id: UserId) -> Arc<Vec<Post>> {
        self.posts_by_user.select(&self.state, user_id)
    }

    /// Times the by-user filter actually ran
    pub fn posts_by_user_recomputations(&self) -> usize {
        self.posts_by_user.recomputations()
    }

    pub fn status(&self) -> LoadStatus {
        selectors::select_posts_status(&self.state)
    }

    pub fn error(&self) -> Option<&str> {
        selectors::select_posts_error(&self.state)
    }
}
