//! Disparity candidates and per-pixel candidate retention.

use std::cmp::Ordering;

/// One disparity hypothesis for a pixel: the horizontal offset to the
/// partner pixel in the other image, and its correlation cost.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisparityCandidate {
    pub disparity: i32,
    pub cost: f32,
}

/// Orders by ascending cost, then smaller |disparity|, then disparity.
fn candidate_cmp(a: &DisparityCandidate, b: &DisparityCandidate) -> Ordering {
    a.cost
        .total_cmp(&b.cost)
        .then_with(|| a.disparity.abs().cmp(&b.disparity.abs()))
        .then_with(|| a.disparity.cmp(&b.disparity))
}

/// Reduces an evaluated cost curve to retained candidates.
///
/// `evals` holds (disparity, cost) pairs for every disparity that was
/// scored. A disparity is a local minimum when its cost does not exceed
/// that of either evaluated neighbour at distance 1; a missing neighbour
/// (window edge or a gap between windows) counts as a boundary, not a
/// competitor. Local minima are ordered by cost (ties prefer the smaller
/// magnitude), truncated to `max_candidates`, and pruned once their cost
/// exceeds the best by more than `rejection_margin`.
pub(crate) fn retain_candidates(
    evals: &mut Vec<(i32, f32)>,
    max_candidates: usize,
    rejection_margin: f32,
) -> Vec<DisparityCandidate> {
    if evals.is_empty() || max_candidates == 0 {
        return Vec::new();
    }
    evals.sort_by_key(|&(d, _)| d);
    evals.dedup_by_key(|&mut (d, _)| d);

    let mut minima = Vec::new();
    for i in 0..evals.len() {
        let (d, cost) = evals[i];
        let left_ok = match i.checked_sub(1).map(|j| evals[j]) {
            Some((dl, cl)) if dl == d - 1 => cost <= cl,
            _ => true,
        };
        let right_ok = match evals.get(i + 1) {
            Some(&(dr, cr)) if dr == d + 1 => cost <= cr,
            _ => true,
        };
        if left_ok && right_ok {
            minima.push(DisparityCandidate { disparity: d, cost });
        }
    }

    minima.sort_by(candidate_cmp);
    minima.truncate(max_candidates);
    if let Some(best) = minima.first().map(|c| c.cost) {
        minima.retain(|c| c.cost <= best + rejection_margin);
    }
    minima
}

/// Per-pixel ordered disparity candidates for one image.
///
/// Every cell holds the surviving candidates sorted by ascending cost; a
/// masked or unmatched pixel holds an empty list. A pixel with exactly one
/// candidate is *reliable*; pixels with several are left ambiguous for a
/// downstream disambiguation step.
pub struct CandidateGrid {
    width: usize,
    height: usize,
    cells: Vec<Vec<DisparityCandidate>>,
}

impl CandidateGrid {
    pub(crate) fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Vec::new(); width * height],
        }
    }

    pub(crate) fn set(&mut self, x: usize, y: usize, candidates: Vec<DisparityCandidate>) {
        self.cells[y * self.width + x] = candidates;
    }

    /// Candidates for `(x, y)`, best first; empty out of bounds.
    pub fn get(&self, x: usize, y: usize) -> &[DisparityCandidate] {
        if x >= self.width || y >= self.height {
            return &[];
        }
        &self.cells[y * self.width + x]
    }

    /// True when exactly one candidate survived at `(x, y)`.
    pub fn is_reliable(&self, x: usize, y: usize) -> bool {
        self.get(x, y).len() == 1
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}
