//! Per-scanline diffusion masks with storage reuse across rows.

use crate::diffusion::weight::{DiffusionWeight, DIR_OFFSETS};
use crate::range::RangeImage;
use crate::util::{DiffMatchError, DiffMatchResult, Progress};

const NO_SLOT: usize = usize::MAX;

/// Diffusion masks for one scanline: for every source pixel `x` of row `y`,
/// a sparse weighted neighbourhood over offsets `(u, v)` with
/// `|u| + |v| <= steps`.
///
/// Masks are built by propagating unit mass from the source pixel through
/// the [`DiffusionWeight`] field for up to `steps` hops and averaging the
/// occupancy over hop counts, so a valid source pixel's mask sums to 1.
/// Mass never enters masked or off-image pixels; mass at a pixel with no
/// valid outgoing direction stays where it is.
///
/// The linear mask arena and the offset index table survive `create` calls
/// with unchanged `(width, steps)`; reuse one instance per scanline sweep
/// instead of constructing a fresh slice per row.
pub struct RangeDiffusionSlice {
    y: usize,
    steps: usize,
    width: usize,
    mask_len: usize,
    /// Row-major per-pixel mask blocks, `width * mask_len` entries.
    data: Vec<f32>,
    /// `(u + steps) + (v + steps) * (2 * steps + 1)` to mask slot.
    slot_index: Vec<usize>,
    /// Mask slot back to its `(u, v)` offset.
    slot_offsets: Vec<(i32, i32)>,
    cur: Vec<f32>,
    next: Vec<f32>,
    acc: Vec<f32>,
    built: bool,
}

impl RangeDiffusionSlice {
    /// Creates an empty slice; call [`RangeDiffusionSlice::create`] before
    /// querying.
    pub fn new() -> Self {
        Self {
            y: 0,
            steps: 0,
            width: 0,
            mask_len: 0,
            data: Vec::new(),
            slot_index: Vec::new(),
            slot_offsets: Vec::new(),
            cur: Vec::new(),
            next: Vec::new(),
            acc: Vec::new(),
            built: false,
        }
    }

    /// Builds the diffusion masks for scanline `y`.
    ///
    /// Retained storage is reused (not reallocated) when `img.width()` and
    /// `steps` match the previous call; previous contents never leak into
    /// the new masks.
    pub fn create(
        &mut self,
        y: usize,
        steps: usize,
        img: &RangeImage,
        weight: &DiffusionWeight,
        progress: &dyn Progress,
    ) -> DiffMatchResult<()> {
        if y >= img.height() {
            return Err(DiffMatchError::RowOutOfRange {
                y,
                height: img.height(),
            });
        }

        let width = img.width();
        self.reserve(width, steps);
        self.y = y;
        self.data.fill(0.0);
        self.built = true;

        let centre_slot = self.slot_index[(steps) + steps * (2 * steps + 1)];
        debug_assert_ne!(centre_slot, NO_SLOT);

        for x in 0..width {
            if progress.is_cancelled() {
                self.built = false;
                return Err(DiffMatchError::Cancelled);
            }
            if !img.valid(x, y) {
                progress.report(x + 1, width);
                continue;
            }

            self.cur.fill(0.0);
            self.acc.fill(0.0);
            self.cur[centre_slot] = 1.0;
            self.acc[centre_slot] = 1.0;

            for _hop in 0..steps {
                self.next.fill(0.0);
                for slot in 0..self.mask_len {
                    let mass = self.cur[slot];
                    if mass <= 0.0 {
                        continue;
                    }
                    let (u, v) = self.slot_offsets[slot];
                    let px = x as i64 + u as i64;
                    let py = y as i64 + v as i64;
                    let w = weight.get_all_signed(px, py);
                    let outgoing = w[0] + w[1] + w[2] + w[3];

                    // Dead ends (all neighbours invalid) hold their mass.
                    let staying = (1.0 - outgoing).max(0.0);
                    if staying > 0.0 {
                        self.next[slot] += mass * staying;
                    }
                    for (dir, &(dx, dy)) in DIR_OFFSETS.iter().enumerate() {
                        if w[dir] <= 0.0 {
                            continue;
                        }
                        let nu = u + dx as i32;
                        let nv = v + dy as i32;
                        let target = self.slot_of(nu, nv);
                        if target != NO_SLOT {
                            self.next[target] += mass * w[dir];
                        }
                    }
                }
                std::mem::swap(&mut self.cur, &mut self.next);
                for (a, c) in self.acc.iter_mut().zip(self.cur.iter()) {
                    *a += *c;
                }
            }

            let norm = 1.0 / (steps as f32 + 1.0);
            let block = &mut self.data[x * self.mask_len..(x + 1) * self.mask_len];
            for (out, a) in block.iter_mut().zip(self.acc.iter()) {
                *out = *a * norm;
            }
            progress.report(x + 1, width);
        }

        Ok(())
    }

    /// Returns the mask weight of offset `(u, v)` for source pixel `x`.
    ///
    /// Zero when `|u| + |v| > steps`, `x` is out of range, the offset was
    /// never reached, or the slice has not been built.
    pub fn get(&self, x: usize, u: i32, v: i32) -> f32 {
        if !self.built || x >= self.width {
            return 0.0;
        }
        let slot = self.slot_of(u, v);
        if slot == NO_SLOT {
            return 0.0;
        }
        self.data[x * self.mask_len + slot]
    }

    /// Width of the slice.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Step budget the slice was built with.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Scanline the slice was built for.
    pub fn y(&self) -> usize {
        self.y
    }

    fn slot_of(&self, u: i32, v: i32) -> usize {
        let steps = self.steps as i32;
        if u.abs() + v.abs() > steps {
            return NO_SLOT;
        }
        let side = 2 * self.steps + 1;
        self.slot_index[(u + steps) as usize + (v + steps) as usize * side]
    }

    /// Resizes the arena and rebuilds the offset tables only when geometry
    /// changed.
    fn reserve(&mut self, width: usize, steps: usize) {
        if steps != self.steps || self.slot_offsets.is_empty() {
            let side = 2 * steps + 1;
            self.slot_index.clear();
            self.slot_index.resize(side * side, NO_SLOT);
            self.slot_offsets.clear();
            let bound = steps as i32;
            for v in -bound..=bound {
                for u in -bound..=bound {
                    if u.abs() + v.abs() > bound {
                        continue;
                    }
                    let idx = (u + bound) as usize + (v + bound) as usize * side;
                    self.slot_index[idx] = self.slot_offsets.len();
                    self.slot_offsets.push((u, v));
                }
            }
            self.steps = steps;
            self.mask_len = self.slot_offsets.len();
            self.cur.clear();
            self.cur.resize(self.mask_len, 0.0);
            self.next.clear();
            self.next.resize(self.mask_len, 0.0);
            self.acc.clear();
            self.acc.resize(self.mask_len, 0.0);
        }
        if self.width != width {
            self.width = width;
            self.data.clear();
        }
        self.data.resize(width * self.mask_len, 0.0);
    }
}

impl Default for RangeDiffusionSlice {
    fn default() -> Self {
        Self::new()
    }
}
