//! Error types for diffmatch.

use thiserror::Error;

/// Result alias for diffmatch operations.
pub type DiffMatchResult<T> = std::result::Result<T, DiffMatchError>;

/// Errors reported by diffmatch constructors and long-running operations.
#[derive(Debug, Error, PartialEq)]
pub enum DiffMatchError {
    /// An image or grid has a zero dimension.
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    /// A provided buffer is shorter than the dimensions require.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },

    /// The two images of a stereo pair have different dimensions.
    #[error("image dimensions differ: {width1}x{height1} vs {width2}x{height2}")]
    DimensionMismatch {
        width1: usize,
        height1: usize,
        width2: usize,
        height2: usize,
    },

    /// A diffusion slice does not match the image it is paired with.
    #[error("slice width {slice_width} does not match image width {image_width}")]
    SliceWidthMismatch {
        slice_width: usize,
        image_width: usize,
    },

    /// The two diffusion slices of a correlation were built with different
    /// step budgets.
    #[error("slice step budgets differ: {steps1} vs {steps2}")]
    StepsMismatch { steps1: usize, steps2: usize },

    /// A scanline index lies outside the image.
    #[error("row {y} out of range for height {height}")]
    RowOutOfRange { y: usize, height: usize },

    /// A configuration field has an unusable value.
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),

    /// The operation observed a cancellation request and aborted. Partially
    /// built state is unspecified and must be discarded.
    #[error("operation cancelled")]
    Cancelled,
}
