//! Colour-range image pyramid.
//!
//! Downsampling halves each dimension with a 2x2 reduction: a coarse pixel
//! is valid iff any of its source pixels is valid, and its range is the
//! interval union over the valid sources. Unioning (rather than averaging)
//! keeps a coarse range a superset of the colours it stands for, so coarse
//! distances underestimate change rather than inventing it.

use crate::range::{ColourRange, RangeImage};
use crate::util::DiffMatchResult;

/// Owned pyramid of colour-range images (level 0 is the base resolution).
pub struct RangePyramid {
    levels: Vec<RangeImage>,
}

impl RangePyramid {
    /// Builds a pyramid from a base image.
    ///
    /// `max_levels` is clamped to at least 1 so the base level is always
    /// present; coarsening stops when either side would drop below 2.
    pub fn build(base: &RangeImage, max_levels: usize) -> DiffMatchResult<Self> {
        let max_levels = max_levels.max(1);
        let mut levels = vec![base.clone()];

        while levels.len() < max_levels {
            let src = levels.last().expect("levels is not empty");
            if src.width() < 4 || src.height() < 4 {
                break;
            }

            let dst_width = src.width() / 2;
            let dst_height = src.height() / 2;
            let mut ranges = Vec::with_capacity(dst_width * dst_height);
            let mut valid = Vec::with_capacity(dst_width * dst_height);

            for y in 0..dst_height {
                for x in 0..dst_width {
                    let mut merged: Option<ColourRange> = None;
                    for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                        if let Some(range) = src.get(2 * x + dx, 2 * y + dy) {
                            merged = Some(match merged {
                                Some(acc) => acc.union(range),
                                None => *range,
                            });
                        }
                    }
                    match merged {
                        Some(range) => {
                            ranges.push(range);
                            valid.push(true);
                        }
                        None => {
                            ranges.push(ColourRange::point([0.0; 3]));
                            valid.push(false);
                        }
                    }
                }
            }

            levels.push(RangeImage::new(ranges, valid, dst_width, dst_height)?);
        }

        Ok(Self { levels })
    }

    /// Returns all levels, finest first.
    pub fn levels(&self) -> &[RangeImage] {
        &self.levels
    }

    /// Returns a specific level.
    pub fn level(&self, index: usize) -> Option<&RangeImage> {
        self.levels.get(index)
    }

    /// Number of levels actually built.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
