//! Hierarchical multi-candidate disparity matching.
//!
//! The matcher prunes the disparity search space coarse-to-fine: the full
//! range is scored only at the coarsest pyramid level, and every finer
//! level re-scores small windows around the surviving parent candidates.
//! Output is symmetric — an ordered candidate list per pixel for both
//! images — with no left-right consistency check; that, like sub-pixel
//! refinement, belongs to downstream consumers.

mod sweep;

use crate::candidate::CandidateGrid;
use crate::diffusion::DiffusionWeight;
use crate::range::pyramid::RangePyramid;
use crate::range::{RangeDistance, RangeImage};
use crate::trace::{trace_event, trace_span};
use crate::util::progress::CancelOnly;
use crate::util::{DiffMatchError, DiffMatchResult, Progress};
use sweep::LevelContext;

/// Tunables of the hierarchical matcher.
#[derive(Clone, Debug)]
pub struct MatchConfig {
    /// Diffusion step budget at the finest level.
    pub steps: usize,
    /// Floor of the per-level schedule `max(steps >> level, min_steps)`;
    /// coarse levels afford smaller budgets since each step covers more
    /// base-resolution ground.
    pub min_steps: usize,
    /// Multiplier applied to range distances before the diffusion-weight
    /// exponential.
    pub dist_mult: f32,
    /// Outlier cap on per-offset distances; also the sentinel cost for
    /// masked or unmatched queries.
    pub dist_cap: f32,
    /// Maximum pyramid depth.
    pub max_levels: usize,
    /// Half-width of the disparity window re-scored around each parent
    /// candidate at finer levels.
    pub window_radius: i32,
    /// Candidates costing more than the pixel's best plus this margin are
    /// rejected.
    pub rejection_margin: f32,
    /// Maximum candidates retained per pixel.
    pub max_candidates: usize,
    /// Inclusive disparity range searched at the finest level; disparity
    /// `d` at pixel `x` points at `x + d` in the other image.
    pub min_disparity: i32,
    /// See [`MatchConfig::min_disparity`].
    pub max_disparity: i32,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            steps: 4,
            min_steps: 1,
            dist_mult: 1.0,
            dist_cap: 1.0,
            max_levels: 5,
            window_radius: 2,
            rejection_margin: 0.5,
            max_candidates: 4,
            min_disparity: -32,
            max_disparity: 32,
        }
    }
}

impl MatchConfig {
    fn validate(&self) -> DiffMatchResult<()> {
        if self.max_levels == 0 {
            return Err(DiffMatchError::InvalidConfig("max_levels must be >= 1"));
        }
        if self.max_candidates == 0 {
            return Err(DiffMatchError::InvalidConfig("max_candidates must be >= 1"));
        }
        if self.min_steps > self.steps {
            return Err(DiffMatchError::InvalidConfig("min_steps exceeds steps"));
        }
        if !self.dist_cap.is_finite() || self.dist_cap < 0.0 {
            return Err(DiffMatchError::InvalidConfig(
                "dist_cap must be finite and non-negative",
            ));
        }
        if !self.dist_mult.is_finite() || self.dist_mult < 0.0 {
            return Err(DiffMatchError::InvalidConfig(
                "dist_mult must be finite and non-negative",
            ));
        }
        if !self.rejection_margin.is_finite() || self.rejection_margin < 0.0 {
            return Err(DiffMatchError::InvalidConfig(
                "rejection_margin must be finite and non-negative",
            ));
        }
        if self.window_radius < 0 {
            return Err(DiffMatchError::InvalidConfig(
                "window_radius must be non-negative",
            ));
        }
        if self.min_disparity > self.max_disparity {
            return Err(DiffMatchError::InvalidConfig(
                "min_disparity exceeds max_disparity",
            ));
        }
        Ok(())
    }
}

/// Per-image candidate grids of a finished matching run.
pub struct MatchOutput {
    /// Candidates for pixels of image 1 (disparity points into image 2).
    pub image1: CandidateGrid,
    /// Candidates for pixels of image 2 (disparity points into image 1).
    pub image2: CandidateGrid,
}

/// The diffusion-correlation stereo matcher.
pub struct Matcher {
    cfg: MatchConfig,
}

impl Matcher {
    /// Creates a matcher after validating the configuration.
    pub fn new(cfg: MatchConfig) -> DiffMatchResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MatchConfig {
        &self.cfg
    }

    /// Runs the full hierarchical match over a rectified pair.
    ///
    /// Progress is reported in completed scanline sweeps across all levels;
    /// a cancellation request aborts with
    /// [`DiffMatchError::Cancelled`] and the output must be discarded.
    pub fn run(
        &self,
        img1: &RangeImage,
        img2: &RangeImage,
        dist: &dyn RangeDistance,
        progress: &dyn Progress,
    ) -> DiffMatchResult<MatchOutput> {
        if img1.width() != img2.width() || img1.height() != img2.height() {
            return Err(DiffMatchError::DimensionMismatch {
                width1: img1.width(),
                height1: img1.height(),
                width2: img2.width(),
                height2: img2.height(),
            });
        }

        let pyramid1 = RangePyramid::build(img1, self.cfg.max_levels)?;
        let pyramid2 = RangePyramid::build(img2, self.cfg.max_levels)?;
        let num_levels = pyramid1.len().min(pyramid2.len());

        let rows_total: usize = (0..num_levels)
            .map(|l| pyramid1.level(l).map_or(0, |img| img.height()))
            .sum();
        let mut rows_done = 0usize;
        let cancel = CancelOnly(progress);

        let mut grids: Option<(CandidateGrid, CandidateGrid)> = None;
        for level in (0..num_levels).rev() {
            let level_img1 = pyramid1.level(level).expect("level within pyramid");
            let level_img2 = pyramid2.level(level).expect("level within pyramid");
            let steps = (self.cfg.steps >> level).max(self.cfg.min_steps);
            let scale = 1i32 << level;
            let d_min = self.cfg.min_disparity.div_euclid(scale);
            let d_max = ceil_div(self.cfg.max_disparity, scale);

            let _span = trace_span!(
                "match_level",
                level = level,
                width = level_img1.width(),
                steps = steps
            )
            .entered();

            let weight1 = DiffusionWeight::create(level_img1, dist, self.cfg.dist_mult, &cancel)?;
            let weight2 = DiffusionWeight::create(level_img2, dist, self.cfg.dist_mult, &cancel)?;

            let ctx = LevelContext {
                img1: level_img1,
                img2: level_img2,
                weight1: &weight1,
                weight2: &weight2,
                dist,
                cfg: &self.cfg,
                steps,
                d_min,
                d_max,
                parents: grids.as_ref(),
            };

            #[cfg(feature = "rayon")]
            let level_grids = sweep::sweep_level_par(&ctx, progress, &mut rows_done, rows_total)?;
            #[cfg(not(feature = "rayon"))]
            let level_grids = sweep::sweep_level(&ctx, progress, &mut rows_done, rows_total)?;

            trace_event!(
                "level_done",
                level = level,
                reliable = count_reliable(&level_grids.0)
            );
            grids = Some(level_grids);
        }

        let (image1, image2) = grids.expect("at least one pyramid level");
        Ok(MatchOutput { image1, image2 })
    }
}

fn ceil_div(a: i32, b: i32) -> i32 {
    debug_assert!(b > 0);
    (a + b - 1).div_euclid(b)
}

fn count_reliable(grid: &CandidateGrid) -> usize {
    let mut count = 0;
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            if grid.is_reliable(x, y) {
                count += 1;
            }
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_fields() {
        assert!(Matcher::new(MatchConfig::default()).is_ok());

        let cfg = MatchConfig {
            max_candidates: 0,
            ..MatchConfig::default()
        };
        assert!(matches!(
            Matcher::new(cfg),
            Err(DiffMatchError::InvalidConfig(_))
        ));

        let cfg = MatchConfig {
            min_disparity: 3,
            max_disparity: -3,
            ..MatchConfig::default()
        };
        assert!(matches!(
            Matcher::new(cfg),
            Err(DiffMatchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn ceil_div_rounds_toward_positive() {
        assert_eq!(ceil_div(5, 2), 3);
        assert_eq!(ceil_div(4, 2), 2);
        assert_eq!(ceil_div(-5, 2), -2);
        assert_eq!(ceil_div(0, 4), 0);
    }
}
