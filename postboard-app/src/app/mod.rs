//! Application state management
//!
//! Reducer pattern: `Action` values go through the pure `reduce` function to
//! produce the next `AppState`; selectors read it back.

pub mod actions;
pub mod reducer;
pub mod selectors;
pub mod state;

pub use actions::Action;
pub use reducer::reduce;
pub use selectors::PostsByUser;
pub use state::{AppState, PostsState};
