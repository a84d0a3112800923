//! Error types for postboard-app
//!
//! Wraps service layer errors together with runtime and lookup failures so
//! the binary has one error type to report and map to an exit code.

use libpostboard::{OperationError, PostId, PostboardError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Service layer error
    #[error("{0}")]
    Service(#[from] PostboardError),

    /// Async runtime could not be started
    #[error("Runtime error: {0}")]
    Runtime(#[from] std::io::Error),

    /// Post id not present in the store
    #[error("Post {0} not found")]
    NotFound(PostId),

    /// Result could not be written as JSON
    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

impl From<OperationError> for AppError {
    fn from(err: OperationError) -> Self {
        AppError::Service(PostboardError::Operation(err))
    }
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Service(e) => e.exit_code(),
            AppError::Runtime(_) | AppError::Output(_) => 1,
            AppError::NotFound(_) => 2,
        }
    }
}

/// Result type for app operations
pub type Result<T> = std::result::Result<T, AppError>;
