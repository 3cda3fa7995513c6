//! Colour-range pixels, validity-masked images of them, and the distance
//! seam between ranges.
//!
//! A colour range is a bounded interval of colour values per pixel, in a
//! perceptual colour space such as Luv. Matching on ranges instead of point
//! samples absorbs small radiometric variation between the two cameras.

use crate::grid::Grid2;
use crate::util::{DiffMatchError, DiffMatchResult};

pub mod pyramid;

/// Per-pixel bounded colour interval with 3-channel endpoints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColourRange {
    pub low: [f32; 3],
    pub high: [f32; 3],
}

impl ColourRange {
    /// A degenerate range containing a single colour.
    pub fn point(colour: [f32; 3]) -> Self {
        Self {
            low: colour,
            high: colour,
        }
    }

    /// Smallest range containing both `self` and `other`.
    pub fn union(&self, other: &Self) -> Self {
        let mut low = self.low;
        let mut high = self.high;
        for c in 0..3 {
            low[c] = low[c].min(other.low[c]);
            high[c] = high[c].max(other.high[c]);
        }
        Self { low, high }
    }
}

/// Dissimilarity between two colour ranges, `>= 0`.
///
/// Stateless by contract: one instance is shared by every component of a
/// matching run.
pub trait RangeDistance: Sync {
    fn dist(&self, a: &ColourRange, b: &ColourRange) -> f32;
}

/// Mean absolute difference of the interval endpoints over all channels.
pub struct EndpointDistance;

impl RangeDistance for EndpointDistance {
    fn dist(&self, a: &ColourRange, b: &ColourRange) -> f32 {
        let mut sum = 0.0f32;
        for c in 0..3 {
            sum += (a.low[c] - b.low[c]).abs();
            sum += (a.high[c] - b.high[c]).abs();
        }
        sum / 6.0
    }
}

/// Colour-range image with a per-pixel validity mask.
///
/// Immutable for the duration of a matching run; every core component holds
/// a shared borrow.
#[derive(Clone, Debug)]
pub struct RangeImage {
    ranges: Grid2<ColourRange>,
    valid: Grid2<bool>,
}

impl RangeImage {
    /// Creates an image from row-major ranges and a matching validity mask.
    pub fn new(
        ranges: Vec<ColourRange>,
        valid: Vec<bool>,
        width: usize,
        height: usize,
    ) -> DiffMatchResult<Self> {
        if ranges.len() != valid.len() {
            return Err(DiffMatchError::BufferTooSmall {
                needed: ranges.len(),
                got: valid.len(),
            });
        }
        Ok(Self {
            ranges: Grid2::from_vec(ranges, width, height)?,
            valid: Grid2::from_vec(valid, width, height)?,
        })
    }

    /// Creates a fully valid image of point ranges.
    pub fn from_colours(
        colours: Vec<[f32; 3]>,
        width: usize,
        height: usize,
    ) -> DiffMatchResult<Self> {
        let len = colours.len();
        let ranges = colours.into_iter().map(ColourRange::point).collect();
        Self::new(ranges, vec![true; len], width, height)
    }

    /// Returns the image width.
    pub fn width(&self) -> usize {
        self.ranges.width()
    }

    /// Returns the image height.
    pub fn height(&self) -> usize {
        self.ranges.height()
    }

    /// True for in-bounds, unmasked pixels.
    pub fn valid(&self, x: usize, y: usize) -> bool {
        self.valid.get(x, y).copied().unwrap_or(false)
    }

    /// Returns the range at `(x, y)` for valid pixels, `None` otherwise.
    pub fn get(&self, x: usize, y: usize) -> Option<&ColourRange> {
        if !self.valid(x, y) {
            return None;
        }
        self.ranges.get(x, y)
    }

    /// Signed-coordinate variant of [`RangeImage::valid`].
    pub fn valid_signed(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.valid(x as usize, y as usize)
    }

    /// Signed-coordinate variant of [`RangeImage::get`].
    pub fn get_signed(&self, x: i64, y: i64) -> Option<&ColourRange> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn union_spans_both_ranges() {
        let a = ColourRange::point([1.0, 2.0, 3.0]);
        let b = ColourRange::point([0.0, 5.0, 3.0]);
        let u = a.union(&b);
        assert_eq!(u.low, [0.0, 2.0, 3.0]);
        assert_eq!(u.high, [1.0, 5.0, 3.0]);
    }

    #[test]
    fn endpoint_distance_is_zero_for_identical_ranges() {
        let a = ColourRange::point([10.0, -3.0, 7.5]);
        assert_eq!(EndpointDistance.dist(&a, &a), 0.0);
    }

    #[test]
    fn masked_pixels_read_as_absent() {
        let ranges = vec![ColourRange::point([0.0; 3]); 4];
        let img = RangeImage::new(ranges, vec![true, false, true, true], 2, 2).unwrap();
        assert!(img.valid(0, 0));
        assert!(!img.valid(1, 0));
        assert!(img.get(1, 0).is_none());
        assert!(!img.valid_signed(-1, 0));
        assert!(img.get_signed(1, 1).is_some());
    }
}
