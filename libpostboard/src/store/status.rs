//! Load lifecycle of the post collection

use serde::{Deserialize, Serialize};

/// Where the collection-level fetch currently stands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Succeeded,
    Failed,
}

impl LoadStatus {
    /// True once a fetch has finished, successfully or not
    pub fn is_settled(&self) -> bool {
        matches!(self, LoadStatus::Succeeded | LoadStatus::Failed)
    }
}

impl std::fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStatus::Idle => write!(f, "idle"),
            LoadStatus::Loading => write!(f, "loading"),
            LoadStatus::Succeeded => write!(f, "succeeded"),
            LoadStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Status plus the message of the last failed fetch.
///
/// Entering `Loading` clears the error, so `error` is only ever set while
/// the status is `Failed`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusTracker {
    status: LoadStatus,
    error: Option<String>,
}

impl StatusTracker {
    pub fn status(&self) -> LoadStatus {
        self.status
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn start(&mut self) {
        self.status = LoadStatus::Loading;
        self.error = None;
    }

    pub fn succeed(&mut self) {
        self.status = LoadStatus::Succeeded;
        self.error = None;
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.status = LoadStatus::Failed;
        self.error = Some(message.into());
    }
}
