//! Diffmatch is a diffusion-weighted stereo correspondence estimator over
//! colour-range images.
//!
//! Pixels are matched on colour *ranges* rather than point samples, with
//! spatially adaptive windows grown by diffusion along low-contrast paths:
//! [`DiffusionWeight`] turns local contrast into per-pixel direction
//! weights, [`RangeDiffusionSlice`] caches the resulting per-scanline
//! diffusion masks, [`DiffuseCorrelation`] combines two scanlines into a
//! symmetric outlier-capped matching cost, and [`Matcher`] runs a
//! coarse-to-fine search producing ordered disparity candidates for every
//! pixel of both images. Optional parallelism is available via the `rayon`
//! feature; diagnostics via the `tracing` feature.

pub mod candidate;
pub mod correlation;
pub mod diffusion;
pub mod grid;
pub mod matching;
pub mod range;
mod trace;
pub mod util;

pub use candidate::{CandidateGrid, DisparityCandidate};
pub use correlation::DiffuseCorrelation;
pub use diffusion::{DiffusionWeight, RangeDiffusionSlice};
pub use grid::Grid2;
pub use matching::{MatchConfig, MatchOutput, Matcher};
pub use range::pyramid::RangePyramid;
pub use range::{ColourRange, EndpointDistance, RangeDistance, RangeImage};
pub use util::{CancelFlag, DiffMatchError, DiffMatchResult, NoProgress, Progress};
