//! Mock gateway implementation for testing
//!
//! Simulates the remote posts resource in memory: configurable list
//! contents, per-operation failures, delete status codes and latency. Every
//! call is recorded so tests can assert on what reached the "server".

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::error::OperationError;
use crate::gateway::{GatewayResult, PostsGateway};
use crate::types::{PostDraft, PostEdits, PostId, RawPost, UserRef};

/// A call that reached the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List,
    Create(PostDraft),
    Update(PostId, PostEdits),
    Delete(PostId),
}

/// Mock gateway for testing
pub struct MockGateway {
    posts: Vec<RawPost>,
    list_error: Option<OperationError>,
    create_error: Option<OperationError>,
    update_error: Option<OperationError>,
    delete_error: Option<OperationError>,
    create_response: Option<RawPost>,
    update_response: Option<RawPost>,
    delete_status: u16,
    delay: Duration,
    scripted_delays: Mutex<VecDeque<Duration>>,
    next_id: AtomicI64,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            list_error: None,
            create_error: None,
            update_error: None,
            delete_error: None,
            create_response: None,
            update_response: None,
            delete_status: 200,
            delay: Duration::from_millis(0),
            scripted_delays: Mutex::new(VecDeque::new()),
            next_id: AtomicI64::new(101),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl MockGateway {
    /// A gateway that succeeds at everything and lists nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// A gateway listing `posts`
    pub fn with_posts(posts: Vec<RawPost>) -> Self {
        Self {
            posts,
            ..Default::default()
        }
    }

    /// Build a raw post the way the remote API lists them
    pub fn raw_post(id: PostId, user_id: i64, title: &str) -> RawPost {
        RawPost {
            id: Some(id),
            title: Some(title.to_string()),
            body: Some(format!("body of {}", title)),
            user_id: Some(UserRef::Number(user_id)),
        }
    }

    pub fn failing_list(mut self, error: OperationError) -> Self {
        self.list_error = Some(error);
        self
    }

    pub fn failing_create(mut self, error: OperationError) -> Self {
        self.create_error = Some(error);
        self
    }

    pub fn failing_update(mut self, error: OperationError) -> Self {
        self.update_error = Some(error);
        self
    }

    pub fn failing_delete(mut self, error: OperationError) -> Self {
        self.delete_error = Some(error);
        self
    }

    /// Respond to create with `response` instead of echoing the draft
    pub fn with_create_response(mut self, response: RawPost) -> Self {
        self.create_response = Some(response);
        self
    }

    /// Respond to update with `response` instead of echoing the edits
    pub fn with_update_response(mut self, response: RawPost) -> Self {
        self.update_response = Some(response);
        self
    }

    /// Status returned by successful deletes (default 200)
    pub fn with_delete_status(mut self, status: u16) -> Self {
        self.delete_status = status;
        self
    }

    /// Latency applied to every call
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Latencies consumed one per call, in call order, before falling back
    /// to the fixed delay
    pub fn with_scripted_delays(self, delays: Vec<Duration>) -> Self {
        if let Ok(mut scripted) = self.scripted_delays.lock() {
            scripted.extend(delays);
        }
        self
    }

    /// Handle on the call log that stays valid after the mock is moved
    pub fn call_log(&self) -> Arc<Mutex<Vec<GatewayCall>>> {
        Arc::clone(&self.calls)
    }

    /// Snapshot of the calls made so far
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Record the call and pick its latency. Both happen synchronously, so
    /// the order of invocation decides which scripted delay a call gets.
    fn begin(&self, call: GatewayCall) -> Duration {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        self.scripted_delays
            .lock()
            .ok()
            .and_then(|mut d| d.pop_front())
            .unwrap_or(self.delay)
    }

    async fn wait(delay: Duration) {
        if delay > Duration::ZERO {
            sleep(delay).await;
        }
    }
}

#[async_trait]
impl PostsGateway for MockGateway {
    async fn list_posts(&self) -> GatewayResult<Vec<RawPost>> {
        let delay = self.begin(GatewayCall::List);
        Self::wait(delay).await;

        match &self.list_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.posts.clone()),
        }
    }

    async fn create_post(&self, draft: &PostDraft) -> GatewayResult<RawPost> {
        let delay = self.begin(GatewayCall::Create(draft.clone()));
        Self::wait(delay).await;

        if let Some(error) = &self.create_error {
            return Err(error.clone());
        }
        if let Some(response) = &self.create_response {
            return Ok(response.clone());
        }

        Ok(RawPost {
            id: Some(self.next_id.fetch_add(1, Ordering::SeqCst)),
            title: Some(draft.title.clone()),
            body: Some(draft.body.clone()),
            user_id: Some(draft.user_id.clone()),
        })
    }

    async fn update_post(&self, id: PostId, edits: &PostEdits) -> GatewayResult<RawPost> {
        let delay = self.begin(GatewayCall::Update(id, edits.clone()));
        Self::wait(delay).await;

        if let Some(error) = &self.update_error {
            return Err(error.clone());
        }
        if let Some(response) = &self.update_response {
            return Ok(response.clone());
        }

        Ok(RawPost {
            id: Some(id),
            title: edits.title.clone(),
            body: edits.body.clone(),
            user_id: edits.user_id.clone(),
        })
    }

    async fn delete_post(&self, id: PostId) -> GatewayResult<u16> {
        let delay = self.begin(GatewayCall::Delete(id));
        Self::wait(delay).await;

        match &self.delete_error {
            Some(error) => Err(error.clone()),
            None => Ok(self.delete_status),
        }
    }

    fn base_url(&self) -> &str {
        "mock://posts"
    }
}
