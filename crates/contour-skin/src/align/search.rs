//! Coarse-to-fine search over the rotation of the second curve.
//!
//! Trying every rotation costs `m` full matrices. Instead a coarse sweep
//! samples every `step`-th rotation, then the window around the best one
//! is narrowed and resampled with half the step until the step reaches one.
//! Final costs vary smoothly with the rotation for resampled curves, so the
//! search lands on the global minimum in practice while filling a small
//! fraction of the matrices.

use std::mem;

use tracing::trace;

use super::AlignParams;
use super::matrix::EditMatrix;
use crate::circular::wrap;
use crate::perimeter::Perimeter;

/// Outcome of the offset search.
#[derive(Debug)]
pub(crate) struct OffsetSearch {
    /// Rotation of P2 with the lowest final cost.
    pub offset: usize,
    /// The matrix filled for that rotation.
    pub matrix: EditMatrix,
    /// Number of matrices filled.
    pub evaluations: usize,
}

/// Find the rotation of `p2` that minimises the edit cost against `p1`.
///
/// Both curves must be non-empty. Open curves have a fixed start, so only
/// rotation 0 is evaluated for them.
pub(crate) fn search_offset(
    p1: &Perimeter,
    p2: &Perimeter,
    delta: f64,
    params: &AlignParams,
) -> OffsetSearch {
    let m = p2.len();

    // Rotation 0 is always the first one the coarse sweep visits.
    let mut best = EditMatrix::compute(p1, p2, 0, delta, params.cost);
    let mut best_offset = 0;
    let mut best_cost = best.final_cost();
    let mut evaluations = 1;

    if !p2.is_closed() || m < 2 {
        return OffsetSearch {
            offset: best_offset,
            matrix: best,
            evaluations,
        };
    }

    let mut scratch = EditMatrix::empty(params.cost);
    let mut step = coarse_step(m, params.coarse_fraction);
    let mut first = 0;
    let mut last = m - 1;

    loop {
        let length = window_length(first, last, m);
        trace!(first, last, length, step, "Searching rotation window");

        let mut k = 0;
        while k < length {
            let offset = (first + k) % m;
            if offset != best_offset {
                scratch.fill(p1, p2, offset, delta);
                evaluations += 1;
                let cost = scratch.final_cost();
                if cost < best_cost {
                    best_cost = cost;
                    best_offset = offset;
                    mem::swap(&mut best, &mut scratch);
                }
            }
            // The window's last rotation is always visited.
            if k != length - 1 && k + step >= length {
                k = length - 1;
            } else {
                k += step;
            }
        }

        if step == 1 {
            break;
        }
        let reach = step as isize - 1;
        first = wrap(best_offset as isize - reach, m);
        last = wrap(best_offset as isize + reach, m);
        step = step.div_ceil(2);
    }

    OffsetSearch {
        offset: best_offset,
        matrix: best,
        evaluations,
    }
}

/// Initial step: `ceil(m * fraction)`, at least 1.
fn coarse_step(m: usize, fraction: f64) -> usize {
    let step = (m as f64 * fraction).ceil();
    if step >= 1.0 {
        step.min(m as f64) as usize
    } else {
        // NaN lands here too
        1
    }
}

/// Number of rotations in the inclusive window `[first, last]`, which may wrap.
fn window_length(first: usize, last: usize, m: usize) -> usize {
    let length = if last >= first {
        last - first + 1
    } else {
        m - first + last + 1
    };
    length.min(m)
}
