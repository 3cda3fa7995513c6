//! Per-pixel direction weights derived from local colour-range contrast.

use crate::grid::Grid2;
use crate::range::{RangeDistance, RangeImage};
use crate::util::{DiffMatchError, DiffMatchResult, Progress};

/// Axis-neighbour offsets, coded 0=+x, 1=+y, 2=-x, 3=-y.
pub const DIR_OFFSETS: [(i64, i64); 4] = [(1, 0), (0, 1), (-1, 0), (0, -1)];

/// Normalised per-pixel weights for diffusing toward each axis neighbour.
///
/// For every valid pixel the four weights sum to 1, except when all four
/// neighbours are masked or off-image, in which case they are all zero.
/// Weight toward an invalid neighbour is exactly zero. Built once per image
/// and queried many times.
pub struct DiffusionWeight {
    weights: Grid2<[f32; 4]>,
}

impl DiffusionWeight {
    /// Computes the weight field from an image and a range distance.
    ///
    /// Distances to valid neighbours are scaled by `dist_mult`, offset by
    /// their per-pixel minimum before the negative exponential (the usual
    /// log-sum-exp stabilisation), and normalised across valid directions.
    pub fn create(
        img: &RangeImage,
        dist: &dyn RangeDistance,
        dist_mult: f32,
        progress: &dyn Progress,
    ) -> DiffMatchResult<Self> {
        let width = img.width();
        let height = img.height();
        let mut weights = Grid2::filled([0.0f32; 4], width, height)?;

        for y in 0..height {
            if progress.is_cancelled() {
                return Err(DiffMatchError::Cancelled);
            }
            for x in 0..width {
                let Some(centre) = img.get(x, y) else {
                    continue;
                };

                let mut dists = [0.0f32; 4];
                let mut usable = [false; 4];
                let mut min_dist = f32::INFINITY;
                for (dir, &(dx, dy)) in DIR_OFFSETS.iter().enumerate() {
                    let nx = x as i64 + dx;
                    let ny = y as i64 + dy;
                    if let Some(neighbour) = img.get_signed(nx, ny) {
                        let d = dist.dist(centre, neighbour) * dist_mult;
                        dists[dir] = d;
                        usable[dir] = true;
                        min_dist = min_dist.min(d);
                    }
                }

                let mut scores = [0.0f32; 4];
                let mut sum = 0.0f32;
                for dir in 0..4 {
                    if usable[dir] {
                        let s = (-(dists[dir] - min_dist)).exp();
                        scores[dir] = s;
                        sum += s;
                    }
                }
                if sum <= 0.0 {
                    continue;
                }

                let out = weights.get_mut(x, y).expect("pixel within grid");
                for dir in 0..4 {
                    out[dir] = scores[dir] / sum;
                }
            }
            progress.report(y + 1, height);
        }

        Ok(Self { weights })
    }

    /// Returns the weight at `(x, y)` toward direction `dir`.
    ///
    /// Out-of-range pixels and directions read as 0.
    pub fn get(&self, x: usize, y: usize, dir: usize) -> f32 {
        if dir >= 4 {
            return 0.0;
        }
        self.weights.get(x, y).map(|w| w[dir]).unwrap_or(0.0)
    }

    /// Returns all four direction weights at `(x, y)`, zeros out of range.
    pub fn get_all(&self, x: usize, y: usize) -> [f32; 4] {
        self.weights.get(x, y).copied().unwrap_or([0.0; 4])
    }

    /// Signed-coordinate variant of [`DiffusionWeight::get_all`].
    pub(crate) fn get_all_signed(&self, x: i64, y: i64) -> [f32; 4] {
        if x < 0 || y < 0 {
            return [0.0; 4];
        }
        self.get_all(x as usize, y as usize)
    }

    /// Width of the underlying image.
    pub fn width(&self) -> usize {
        self.weights.width()
    }

    /// Height of the underlying image.
    pub fn height(&self) -> usize {
        self.weights.height()
    }
}
