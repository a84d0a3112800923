//! Error types for Postboard

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PostboardError>;

#[derive(Error, Debug)]
pub enum PostboardError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Operation error: {0}")]
    Operation(#[from] OperationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl PostboardError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PostboardError::InvalidInput(_) => 3,
            PostboardError::Operation(OperationError::Http { status: 404, .. }) => 2,
            PostboardError::Operation(_) => 1,
            PostboardError::Config(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failure of a single remote operation.
///
/// `Network` and `Http` make up the network-or-HTTP class (the call itself
/// failed); `Malformed` means the call succeeded but the payload it resolved
/// with cannot be stored.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OperationError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Request failed with status {status}: {reason}")]
    Http { status: u16, reason: String },

    #[error("Malformed result: {0}")]
    Malformed(String),
}

impl OperationError {
    /// True for failures of the call itself (transport or non-success status)
    pub fn is_network_or_http(&self) -> bool {
        matches!(self, OperationError::Network(_) | OperationError::Http { .. })
    }

    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            OperationError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for OperationError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => OperationError::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("unknown").to_string(),
            },
            None if err.is_decode() => OperationError::Malformed(err.to_string()),
            None => OperationError::Network(err.to_string()),
        }
    }
}
