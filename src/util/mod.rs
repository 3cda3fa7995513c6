//! Shared utility helpers.

pub mod error;
pub mod progress;

pub use error::{DiffMatchError, DiffMatchResult};
pub use progress::{CancelFlag, NoProgress, Progress};
