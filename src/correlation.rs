//! Diffusion-weighted matching cost between two scanlines.

use crate::diffusion::RangeDiffusionSlice;
use crate::range::{RangeDistance, RangeImage};
use crate::util::{DiffMatchError, DiffMatchResult};

/// Symmetric, outlier-capped matching cost between pixels of two scanlines.
///
/// Borrows two image/slice pairs and a range distance; every referenced
/// object must outlive the correlation, which the lifetimes enforce. Both
/// slices must have been built with the same step budget and must match
/// their image widths; this is validated at construction.
pub struct DiffuseCorrelation<'a> {
    dist: &'a dyn RangeDistance,
    dist_cap: f32,
    img1: &'a RangeImage,
    slice1: &'a RangeDiffusionSlice,
    img2: &'a RangeImage,
    slice2: &'a RangeDiffusionSlice,
}

impl<'a> DiffuseCorrelation<'a> {
    /// Binds the correlation inputs.
    pub fn new(
        dist: &'a dyn RangeDistance,
        dist_cap: f32,
        img1: &'a RangeImage,
        slice1: &'a RangeDiffusionSlice,
        img2: &'a RangeImage,
        slice2: &'a RangeDiffusionSlice,
    ) -> DiffMatchResult<Self> {
        if !dist_cap.is_finite() || dist_cap < 0.0 {
            return Err(DiffMatchError::InvalidConfig(
                "distance cap must be finite and non-negative",
            ));
        }
        if slice1.steps() != slice2.steps() {
            return Err(DiffMatchError::StepsMismatch {
                steps1: slice1.steps(),
                steps2: slice2.steps(),
            });
        }
        for (slice, img) in [(&slice1, &img1), (&slice2, &img2)] {
            if slice.width() != img.width() {
                return Err(DiffMatchError::SliceWidthMismatch {
                    slice_width: slice.width(),
                    image_width: img.width(),
                });
            }
        }
        Ok(Self {
            dist,
            dist_cap,
            img1,
            slice1,
            img2,
            slice2,
        })
    }

    /// Matching cost between pixel `x1` of image 1 and `x2` of image 2.
    ///
    /// Sums `(w1 + w2) * min(dist, cap)` over every offset both diffusion
    /// masks reach and halves the total. Returns exactly the distance cap
    /// when either pixel is masked or out of range, or when the masks share
    /// no offset — the cap doubles as the worst-case sentinel.
    ///
    /// This walks O(steps^2) offsets per call; callers are expected to
    /// prune the number of calls, not the call itself.
    pub fn cost(&self, x1: usize, x2: usize) -> f32 {
        let y1 = self.slice1.y();
        let y2 = self.slice2.y();
        if !self.img1.valid(x1, y1) || !self.img2.valid(x2, y2) {
            return self.dist_cap;
        }

        let steps = self.slice1.steps() as i32;
        let mut sum = 0.0f32;
        let mut overlap = false;
        for v in -steps..=steps {
            let reach = steps - v.abs();
            for u in -reach..=reach {
                let w1 = self.slice1.get(x1, u, v);
                if w1 <= 0.0 {
                    continue;
                }
                let w2 = self.slice2.get(x2, u, v);
                if w2 <= 0.0 {
                    continue;
                }
                let a = self.img1.get_signed(x1 as i64 + u as i64, y1 as i64 + v as i64);
                let b = self.img2.get_signed(x2 as i64 + u as i64, y2 as i64 + v as i64);
                let (Some(a), Some(b)) = (a, b) else {
                    continue;
                };
                let d = self.dist.dist(a, b).min(self.dist_cap);
                sum += (w1 + w2) * d;
                overlap = true;
            }
        }

        if !overlap {
            return self.dist_cap;
        }
        sum / 2.0
    }

    /// Width of image 1.
    pub fn width1(&self) -> usize {
        self.img1.width()
    }

    /// Width of image 2.
    pub fn width2(&self) -> usize {
        self.img2.width()
    }

    /// The outlier cap, also the sentinel for degenerate queries.
    pub fn distance_cap(&self) -> f32 {
        self.dist_cap
    }

    /// Step budget shared by both slices.
    pub fn steps(&self) -> usize {
        self.slice1.steps()
    }
}
