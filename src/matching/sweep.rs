//! Per-level scanline sweeps of the hierarchical matcher.

use crate::candidate::{retain_candidates, CandidateGrid, DisparityCandidate};
use crate::correlation::DiffuseCorrelation;
use crate::diffusion::{DiffusionWeight, RangeDiffusionSlice};
use crate::matching::MatchConfig;
use crate::range::{RangeDistance, RangeImage};
use crate::util::progress::CancelOnly;
use crate::util::{DiffMatchError, DiffMatchResult, Progress};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
#[cfg(feature = "rayon")]
use std::sync::atomic::{AtomicUsize, Ordering};

/// Everything a row sweep needs from its level, borrowed read-only so rows
/// can run on independent workers.
pub(crate) struct LevelContext<'a> {
    pub img1: &'a RangeImage,
    pub img2: &'a RangeImage,
    pub weight1: &'a DiffusionWeight,
    pub weight2: &'a DiffusionWeight,
    pub dist: &'a dyn RangeDistance,
    pub cfg: &'a MatchConfig,
    pub steps: usize,
    pub d_min: i32,
    pub d_max: i32,
    pub parents: Option<&'a (CandidateGrid, CandidateGrid)>,
}

/// Per-worker scratch: the reusable slice pair plus small buffers.
pub(crate) struct RowScratch {
    slice1: RangeDiffusionSlice,
    slice2: RangeDiffusionSlice,
    wanted: Vec<i32>,
    evals: Vec<(i32, f32)>,
}

impl RowScratch {
    pub(crate) fn new() -> Self {
        Self {
            slice1: RangeDiffusionSlice::new(),
            slice2: RangeDiffusionSlice::new(),
            wanted: Vec::new(),
            evals: Vec::new(),
        }
    }
}

type RowCells = Vec<Vec<DisparityCandidate>>;

/// Sweeps one level sequentially, reusing a single slice pair across rows.
#[cfg_attr(feature = "rayon", allow(dead_code))]
pub(crate) fn sweep_level(
    ctx: &LevelContext<'_>,
    progress: &dyn Progress,
    rows_done: &mut usize,
    rows_total: usize,
) -> DiffMatchResult<(CandidateGrid, CandidateGrid)> {
    let width = ctx.img1.width();
    let height = ctx.img1.height();
    let mut grid1 = CandidateGrid::empty(width, height);
    let mut grid2 = CandidateGrid::empty(width, height);
    let mut scratch = RowScratch::new();

    for y in 0..height {
        if progress.is_cancelled() {
            return Err(DiffMatchError::Cancelled);
        }
        let (cells1, cells2) = sweep_row(ctx, y, &mut scratch, progress)?;
        store_row(&mut grid1, y, cells1);
        store_row(&mut grid2, y, cells2);
        *rows_done += 1;
        progress.report(*rows_done, rows_total);
    }

    Ok((grid1, grid2))
}

/// Row-parallel level sweep; each worker owns its slice pair via
/// `map_init`, shared inputs are read-only.
#[cfg(feature = "rayon")]
pub(crate) fn sweep_level_par(
    ctx: &LevelContext<'_>,
    progress: &dyn Progress,
    rows_done: &mut usize,
    rows_total: usize,
) -> DiffMatchResult<(CandidateGrid, CandidateGrid)> {
    let width = ctx.img1.width();
    let height = ctx.img1.height();
    let counter = AtomicUsize::new(*rows_done);

    let rows: Vec<(usize, RowCells, RowCells)> = (0..height)
        .into_par_iter()
        .map_init(RowScratch::new, |scratch, y| {
            if progress.is_cancelled() {
                return Err(DiffMatchError::Cancelled);
            }
            let (cells1, cells2) = sweep_row(ctx, y, scratch, progress)?;
            let done = counter.fetch_add(1, Ordering::Relaxed) + 1;
            progress.report(done, rows_total);
            Ok((y, cells1, cells2))
        })
        .collect::<DiffMatchResult<Vec<_>>>()?;

    let mut grid1 = CandidateGrid::empty(width, height);
    let mut grid2 = CandidateGrid::empty(width, height);
    for (y, cells1, cells2) in rows {
        store_row(&mut grid1, y, cells1);
        store_row(&mut grid2, y, cells2);
    }
    *rows_done = counter.load(Ordering::Relaxed);
    Ok((grid1, grid2))
}

fn store_row(grid: &mut CandidateGrid, y: usize, cells: RowCells) {
    for (x, cell) in cells.into_iter().enumerate() {
        grid.set(x, y, cell);
    }
}

/// Builds both scanline slices and scores both match directions for row `y`.
fn sweep_row(
    ctx: &LevelContext<'_>,
    y: usize,
    scratch: &mut RowScratch,
    progress: &dyn Progress,
) -> DiffMatchResult<(RowCells, RowCells)> {
    let cancel = CancelOnly(progress);
    scratch
        .slice1
        .create(y, ctx.steps, ctx.img1, ctx.weight1, &cancel)?;
    scratch
        .slice2
        .create(y, ctx.steps, ctx.img2, ctx.weight2, &cancel)?;
    let corr = DiffuseCorrelation::new(
        ctx.dist,
        ctx.cfg.dist_cap,
        ctx.img1,
        &scratch.slice1,
        ctx.img2,
        &scratch.slice2,
    )?;

    let cells1 = sweep_row_direction(
        ctx,
        y,
        ctx.img1,
        ctx.img2.width(),
        ctx.parents.map(|(g1, _)| g1),
        |x, partner| corr.cost(x, partner),
        &mut scratch.wanted,
        &mut scratch.evals,
    );
    let cells2 = sweep_row_direction(
        ctx,
        y,
        ctx.img2,
        ctx.img1.width(),
        ctx.parents.map(|(_, g2)| g2),
        |x, partner| corr.cost(partner, x),
        &mut scratch.wanted,
        &mut scratch.evals,
    );
    Ok((cells1, cells2))
}

/// Scores disparity hypotheses for every pixel of one row in one match
/// direction. Disparity `d` at pixel `x` points at partner `x + d` in the
/// other image; hypotheses whose partner falls outside the other image are
/// excluded from the search entirely.
#[allow(clippy::too_many_arguments)]
fn sweep_row_direction(
    ctx: &LevelContext<'_>,
    y: usize,
    img: &RangeImage,
    other_width: usize,
    parents: Option<&CandidateGrid>,
    cost: impl Fn(usize, usize) -> f32,
    wanted: &mut Vec<i32>,
    evals: &mut Vec<(i32, f32)>,
) -> RowCells {
    let width = img.width();
    let mut cells = Vec::with_capacity(width);

    for x in 0..width {
        if !img.valid(x, y) {
            cells.push(Vec::new());
            continue;
        }

        collect_wanted(ctx, parents, x, y, wanted);

        evals.clear();
        for &d in wanted.iter() {
            let partner = x as i64 + d as i64;
            if partner < 0 || partner >= other_width as i64 {
                continue;
            }
            evals.push((d, cost(x, partner as usize)));
        }
        cells.push(retain_candidates(
            evals,
            ctx.cfg.max_candidates,
            ctx.cfg.rejection_margin,
        ));
    }

    cells
}

/// Collects the disparities to score for pixel `(x, y)`: the full
/// level-scaled range at the coarsest level (or when the parent retained
/// nothing), otherwise windows around each parent candidate mapped by the
/// pyramid scale.
fn collect_wanted(
    ctx: &LevelContext<'_>,
    parents: Option<&CandidateGrid>,
    x: usize,
    y: usize,
    wanted: &mut Vec<i32>,
) {
    wanted.clear();

    if let Some(parent_grid) = parents {
        let parent = parent_grid.get(x / 2, y / 2);
        if !parent.is_empty() {
            let radius = ctx.cfg.window_radius;
            for cand in parent {
                let centre = cand.disparity * 2;
                let lo = (centre - radius).max(ctx.d_min);
                let hi = (centre + radius).min(ctx.d_max);
                for d in lo..=hi {
                    wanted.push(d);
                }
            }
            wanted.sort_unstable();
            wanted.dedup();
            return;
        }
    }

    wanted.extend(ctx.d_min..=ctx.d_max);
}
