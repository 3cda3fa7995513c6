//! Diffusion weights and per-scanline diffusion masks.
//!
//! [`DiffusionWeight`] turns local colour-range contrast into per-pixel
//! direction weights; [`RangeDiffusionSlice`] walks those weights outward
//! from every pixel of one scanline to build the spatially adaptive
//! matching windows the correlation cost is computed over.

mod slice;
mod weight;

pub use slice::RangeDiffusionSlice;
pub use weight::{DiffusionWeight, DIR_OFFSETS};
