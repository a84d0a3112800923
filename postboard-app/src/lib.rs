//! postboard-app library
//!
//! Client-side state for the post board: reducer, selectors and the
//! dispatcher that drives the async operations. Used by the `postboard`
//! binary and by the integration tests.

pub mod app;
pub mod dispatcher;
pub mod error;

// Re-export commonly used types
pub use app::{reduce, Action, AppState, PostsByUser};
pub use dispatcher::{Dispatcher, OperationHandle};
pub use error::{AppError, Result};
