//! Lifecycle events for post operations
//!
//! Every operation moves through `Pending` and then exactly one of
//! `Fulfilled` or `Rejected`. Each transition is emitted as a `PostsEvent`
//! onto a single unbounded queue whose one consumer applies it to the
//! application state.
//!
//! # Delivery Order
//!
//! Events are consumed in the order they are sent, which is the order in
//! which calls *resolve*, not the order in which they were issued.
//!
//! # Example
//!
//! ```
//! use libpostboard::service::events::{event_queue, Lifecycle, PostsEvent};
//!
//! let (sender, receiver) = event_queue();
//! sender.emit(PostsEvent::FetchPosts(Lifecycle::pending(uuid::Uuid::new_v4())));
//!
//! let event = receiver.try_recv().unwrap();
//! assert_eq!(event.type_name(), "posts/fetchPosts/pending");
//! ```

use chrono::{DateTime, Utc};
use crossbeam_channel::{unbounded, Receiver, Sender};
use uuid::Uuid;

use crate::error::OperationError;
use crate::types::{PostEdits, PostRef, ReceivedPost};

/// Receiving end of the event queue
pub type EventReceiver = Receiver<PostsEvent>;

/// Create the event queue shared by the service and its consumer
pub fn event_queue() -> (EventSender, EventReceiver) {
    let (tx, rx) = unbounded();
    (EventSender { tx }, rx)
}

/// Sending end of the event queue
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: Sender<PostsEvent>,
}

impl EventSender {
    /// Emit an event. Never blocks; if the consumer is gone the event is
    /// dropped.
    pub fn emit(&self, event: PostsEvent) {
        let type_name = event.type_name();
        if self.tx.send(event).is_err() {
            tracing::debug!(event = %type_name, "Event queue closed, dropping event");
        }
    }
}

/// Phase of an operation together with its payload or error
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Pending,
    Fulfilled(T),
    Rejected(OperationError),
}

/// A lifecycle event for one invocation of an operation
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle<T> {
    /// Identifies the invocation; shared by all of its events
    pub request_id: Uuid,
    /// When the event was produced; reducers use it as "now"
    pub timestamp: DateTime<Utc>,
    pub phase: Phase<T>,
}

impl<T> Lifecycle<T> {
    pub fn new(request_id: Uuid, timestamp: DateTime<Utc>, phase: Phase<T>) -> Self {
        Self {
            request_id,
            timestamp,
            phase,
        }
    }

    pub fn pending(request_id: Uuid) -> Self {
        Self::new(request_id, Utc::now(), Phase::Pending)
    }

    pub fn fulfilled(request_id: Uuid, payload: T) -> Self {
        Self::new(request_id, Utc::now(), Phase::Fulfilled(payload))
    }

    pub fn rejected(request_id: Uuid, error: OperationError) -> Self {
        Self::new(request_id, Utc::now(), Phase::Rejected(error))
    }

    pub fn phase_name(&self) -> &'static str {
        match self.phase {
            Phase::Pending => "pending",
            Phase::Fulfilled(_) => "fulfilled",
            Phase::Rejected(_) => "rejected",
        }
    }
}

/// Payload of a fulfilled update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub edits: PostEdits,
    /// False when the server call failed and the edits are applied locally
    pub confirmed: bool,
}

/// Events emitted by `PostsService`
#[derive(Debug, Clone, PartialEq)]
pub enum PostsEvent {
    /// Posts in server order; entries without a usable id or author are
    /// dropped before fulfilment
    FetchPosts(Lifecycle<Vec<ReceivedPost>>),
    AddNewPost(Lifecycle<ReceivedPost>),
    UpdatePost(Lifecycle<UpdateOutcome>),
    DeletePost(Lifecycle<PostRef>),
}

impl PostsEvent {
    pub fn request_id(&self) -> Uuid {
        match self {
            PostsEvent::FetchPosts(l) => l.request_id,
            PostsEvent::AddNewPost(l) => l.request_id,
            PostsEvent::UpdatePost(l) => l.request_id,
            PostsEvent::DeletePost(l) => l.request_id,
        }
    }

    /// Action type in `posts/operation/phase` form, used in logs
    pub fn type_name(&self) -> String {
        let (operation, phase) = match self {
            PostsEvent::FetchPosts(l) => ("fetchPosts", l.phase_name()),
            PostsEvent::AddNewPost(l) => ("addNewPost", l.phase_name()),
            PostsEvent::UpdatePost(l) => ("updatePost", l.phase_name()),
            PostsEvent::DeletePost(l) => ("deletePost", l.phase_name()),
        };
        format!("posts/{}/{}", operation, phase)
    }
}
