//! Circular curve alignment.
//!
//! Two closed curves traced independently have no common start point. The
//! aligner finds the rotation of the second curve and the sequence of edit
//! operations (delete a point of P1, insert a point of P2, or match one point
//! of each) with minimum total cost. The result is a dense correspondence
//! between the two curves that [`crate::mesh::Mesh::add_skin`] turns into faces.
//!
//! # Example
//!
//! ```
//! use contour_skin::{EditKind, Perimeter, align};
//!
//! let square = Perimeter::new(&[0.0, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0], 0.0, true).unwrap();
//! let above = Perimeter::new(&[0.0, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0], 1.0, true).unwrap();
//!
//! let edits = align(&square, &above, 1.0).unwrap();
//! assert_eq!(edits.start_offset_p2(), 0);
//! assert_eq!(edits.total_cost(), 0.0);
//! assert!(edits.iter().all(|op| op.kind == EditKind::Mutate && op.i == op.j));
//! ```

mod matrix;
mod search;

pub use matrix::{EditMatrix, MutationCost};

use tracing::{debug, error};

use crate::circular::wrap;
use crate::error::{ContourError, ContourResult, check_spacing};
use crate::perimeter::Perimeter;
use crate::tracing_ext::log_alignment;

/// Kind of an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// A point of P1 with no counterpart in P2.
    Delete,
    /// A point of P2 with no counterpart in P1.
    Insert,
    /// A point of P1 matched with a point of P2.
    Mutate,
}

/// One edit operation.
///
/// `i` indexes P1 and `j` indexes P2 after rotation by
/// [`EditSequence::start_offset_p2`]. For a deletion `j` is the P2 point the
/// deleted P1 point stays attached to; for an insertion `i` is the P1 point
/// the inserted P2 point attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EditOp {
    pub kind: EditKind,
    pub i: usize,
    pub j: usize,
}

impl EditOp {
    fn new(kind: EditKind, i: usize, j: usize) -> Self {
        Self { kind, i, j }
    }
}

/// Number of operations of each kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditCounts {
    pub deletions: usize,
    pub insertions: usize,
    pub mutations: usize,
}

/// Minimum-cost edit sequence between two curves, in forward order.
#[derive(Debug, Clone)]
pub struct EditSequence {
    operations: Vec<EditOp>,
    start_offset_p2: usize,
    total_cost: f64,
    len_p1: usize,
    len_p2: usize,
}

impl EditSequence {
    /// The operations, in forward order.
    #[inline]
    pub fn operations(&self) -> &[EditOp] {
        &self.operations
    }

    /// Iterate over the operations.
    pub fn iter(&self) -> std::slice::Iter<'_, EditOp> {
        self.operations.iter()
    }

    /// Number of operations.
    #[inline]
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether there are no operations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Index of P2 that was used as its start point.
    #[inline]
    pub fn start_offset_p2(&self) -> usize {
        self.start_offset_p2
    }

    /// Cost of the whole sequence.
    #[inline]
    pub fn total_cost(&self) -> f64 {
        self.total_cost
    }

    /// Number of points in P1.
    #[inline]
    pub fn len_p1(&self) -> usize {
        self.len_p1
    }

    /// Number of points in P2.
    #[inline]
    pub fn len_p2(&self) -> usize {
        self.len_p2
    }

    /// Map a rotated P2 index back to an index into P2's points.
    #[inline]
    pub fn p2_index(&self, j: usize) -> usize {
        (self.start_offset_p2 + j) % self.len_p2
    }

    /// Count operations by kind.
    pub fn counts(&self) -> EditCounts {
        let mut counts = EditCounts::default();
        for op in &self.operations {
            match op.kind {
                EditKind::Delete => counts.deletions += 1,
                EditKind::Insert => counts.insertions += 1,
                EditKind::Mutate => counts.mutations += 1,
            }
        }
        counts
    }
}

impl<'a> IntoIterator for &'a EditSequence {
    type Item = &'a EditOp;
    type IntoIter = std::slice::Iter<'a, EditOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}

/// Parameters for [`align_with_params`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct AlignParams {
    /// First sweep of the rotation search visits every
    /// `ceil(m * coarse_fraction)`-th rotation.
    ///
    /// Default: `0.1`. Use `0.0` to try every rotation.
    pub coarse_fraction: f64,

    /// Tolerance used when backtracking through the edit matrix.
    ///
    /// Default: `1e-5`
    pub tolerance: f64,

    /// Cost of matching two points.
    ///
    /// Default: [`MutationCost::PointDistance`]
    pub cost: MutationCost,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            coarse_fraction: 0.1,
            tolerance: 1e-5,
            cost: MutationCost::PointDistance,
        }
    }
}

impl AlignParams {
    /// Try every rotation of P2. Slow, but never misses the global minimum.
    pub fn exhaustive() -> Self {
        Self {
            coarse_fraction: 0.0,
            ..Default::default()
        }
    }

    /// Match points by direction rather than position.
    pub fn translation_invariant() -> Self {
        Self {
            cost: MutationCost::DirectionDifference,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_coarse_fraction(mut self, fraction: f64) -> Self {
        self.coarse_fraction = fraction;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn with_cost(mut self, cost: MutationCost) -> Self {
        self.cost = cost;
        self
    }
}

/// Align two curves with default parameters.
///
/// `delta` is the cost of one insertion or deletion, normally the spacing
/// both curves were resampled to.
///
/// # Errors
///
/// - [`ContourError::DegenerateInput`] if either curve is empty or has a
///   non-finite coordinate
/// - [`ContourError::InvalidSpacing`] if `delta` is not finite and positive
/// - [`ContourError::NumericToleranceMiss`] if backtracking fails (a bug)
pub fn align(p1: &Perimeter, p2: &Perimeter, delta: f64) -> ContourResult<EditSequence> {
    align_with_params(p1, p2, delta, &AlignParams::default())
}

/// Align two curves with custom parameters. See [`align`].
pub fn align_with_params(
    p1: &Perimeter,
    p2: &Perimeter,
    delta: f64,
    params: &AlignParams,
) -> ContourResult<EditSequence> {
    check_spacing(delta)?;
    if p1.is_empty() || p2.is_empty() {
        return Err(ContourError::degenerate_input(format!(
            "cannot align curves with {} and {} points",
            p1.len(),
            p2.len()
        )));
    }
    if p1.has_non_finite() || p2.has_non_finite() {
        return Err(ContourError::degenerate_input(
            "cannot align curves with non-finite coordinates",
        ));
    }

    let found = search::search_offset(p1, p2, delta, params);
    debug!(
        offset = found.offset,
        evaluations = found.evaluations,
        "Rotation search finished"
    );

    let operations = backtrack(p1, p2, &found.matrix, params.tolerance)?;
    let sequence = EditSequence {
        operations,
        start_offset_p2: found.offset,
        total_cost: found.matrix.final_cost(),
        len_p1: p1.len(),
        len_p2: p2.len(),
    };
    log_alignment(&sequence);
    Ok(sequence)
}

/// Walk back from `(n, m)` to recover the operations, in forward order.
///
/// Branches are tried deletion first, then insertion, then mutation.
fn backtrack(
    p1: &Perimeter,
    p2: &Perimeter,
    matrix: &EditMatrix,
    tolerance: f64,
) -> ContourResult<Vec<EditOp>> {
    let n = p1.len();
    let m = p2.len();
    let delta = matrix.delta();
    let mut operations = Vec::with_capacity(n + m);

    let (mut i, mut j) = (n, m);
    while i > 0 && j > 0 {
        let here = matrix.get(i, j);
        if (here - matrix.get(i - 1, j) - delta).abs() < tolerance {
            operations.push(EditOp::new(EditKind::Delete, i - 1, wrap(j as isize - 1, m)));
            i -= 1;
        } else if (here - matrix.get(i, j - 1) - delta).abs() < tolerance {
            operations.push(EditOp::new(EditKind::Insert, wrap(i as isize - 1, n), j - 1));
            j -= 1;
        } else if (here - matrix.mutation(p1, p2, i, j)).abs() < tolerance {
            operations.push(EditOp::new(EditKind::Mutate, i - 1, j - 1));
            i -= 1;
            j -= 1;
        } else {
            error!(i, j, value = here, "Edit matrix backtracking found no branch");
            return Err(ContourError::NumericToleranceMiss { i, j });
        }
    }
    while j > 0 {
        operations.push(EditOp::new(EditKind::Insert, wrap(i as isize - 1, n), j - 1));
        j -= 1;
    }
    while i > 0 {
        operations.push(EditOp::new(EditKind::Delete, i - 1, wrap(j as isize - 1, m)));
        i -= 1;
    }

    operations.reverse();
    Ok(operations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::TAU;

    fn square(z: f64) -> Perimeter {
        Perimeter::new(&[0.0, 1.0, 1.0, 0.0], &[0.0, 0.0, 1.0, 1.0], z, true).unwrap()
    }

    fn ring(n: usize, radius: f64, z: f64) -> Perimeter {
        let (xs, ys): (Vec<f64>, Vec<f64>) = (0..n)
            .map(|k| {
                let t = TAU * k as f64 / n as f64;
                (radius * t.cos(), radius * t.sin())
            })
            .unzip();
        Perimeter::new(&xs, &ys, z, true).unwrap()
    }

    /// Replays the operations from (0, 0) and checks they end at (n, m).
    fn assert_replays(seq: &EditSequence) {
        let (mut a, mut b) = (0, 0);
        for op in seq {
            match op.kind {
                EditKind::Mutate => {
                    assert_eq!((op.i, op.j), (a, b));
                    a += 1;
                    b += 1;
                }
                EditKind::Delete => {
                    assert_eq!(op.i, a);
                    a += 1;
                }
                EditKind::Insert => {
                    assert_eq!(op.j, b);
                    b += 1;
                }
            }
        }
        assert_eq!((a, b), (seq.len_p1(), seq.len_p2()));
    }

    #[test]
    fn test_identity() {
        let seq = align(&square(0.0), &square(1.0), 1.0).unwrap();
        assert_eq!(seq.start_offset_p2(), 0);
        assert_relative_eq!(seq.total_cost(), 0.0);
        assert_eq!(seq.len(), 4);
        for (k, op) in seq.iter().enumerate() {
            assert_eq!(*op, EditOp::new(EditKind::Mutate, k, k));
        }
    }

    #[test]
    fn test_square_shifted_by_one_corner() {
        let mut shifted = square(1.0);
        shifted.reorder(1);
        let seq = align(&square(0.0), &shifted, 1.0).unwrap();
        assert!(seq.start_offset_p2() == 1 || seq.start_offset_p2() == 3);
        assert_relative_eq!(seq.total_cost(), 0.0);
        assert_eq!(
            seq.counts(),
            EditCounts {
                deletions: 0,
                insertions: 0,
                mutations: 4,
            }
        );
        assert_replays(&seq);
    }

    #[test]
    fn test_ten_against_twelve_points() {
        let p1 = ring(10, 10.0, 0.0);
        let p2 = ring(12, 10.0, 1.0);
        for delta in [p1.average_spacing(), p2.average_spacing(), 5.678] {
            let seq = align(&p1, &p2, delta).unwrap();
            let counts = seq.counts();
            assert_eq!(counts.mutations, 10);
            assert_eq!(counts.insertions, 2);
            assert_eq!(counts.deletions, 0);
            // two insertions plus the distances between matched points, which
            // never coincide on rings of different density: about 4 * delta
            let cost = seq.total_cost() / delta;
            assert!(cost >= 3.5 && cost <= 4.5, "cost {} * delta", cost);
            assert_replays(&seq);
        }
    }

    #[test]
    fn test_every_index_is_referenced() {
        let p1 = ring(17, 3.0, 0.0);
        let mut p2 = ring(23, 3.5, 1.0);
        p2.reorder(9);
        let seq = align(&p1, &p2, p1.average_spacing()).unwrap();

        let mut seen_i = vec![false; p1.len()];
        let mut seen_j = vec![false; p2.len()];
        for op in &seq {
            seen_i[op.i] = true;
            seen_j[op.j] = true;
        }
        assert!(seen_i.iter().all(|&s| s));
        assert!(seen_j.iter().all(|&s| s));
        assert_replays(&seq);
    }

    #[test]
    fn test_p2_index_maps_rotation() {
        let mut shifted = ring(20, 2.0, 1.0);
        shifted.reorder(6);
        let seq = align(&ring(20, 2.0, 0.0), &shifted, 0.6).unwrap();
        assert_eq!(seq.start_offset_p2(), 14);
        assert_eq!(seq.p2_index(0), 14);
        assert_eq!(seq.p2_index(6), 0);
    }

    #[test]
    fn test_single_point_against_ring() {
        let dot = Perimeter::new(&[0.0], &[0.0], 0.0, true).unwrap();
        let seq = align(&dot, &ring(5, 1.0, 1.0), 1.0).unwrap();
        assert_replays(&seq);
        assert_eq!(seq.counts().insertions + seq.counts().mutations, 5);
    }

    #[test]
    fn test_rejects_empty_and_bad_delta() {
        let empty = Perimeter::from_points(Vec::new(), 0.0, true);
        assert!(matches!(
            align(&empty, &square(1.0), 1.0),
            Err(ContourError::DegenerateInput { .. })
        ));
        assert!(matches!(
            align(&square(0.0), &square(1.0), -1.0),
            Err(ContourError::InvalidSpacing { .. })
        ));
    }

    #[test]
    fn test_exhaustive_params_agree_on_rings() {
        let p1 = ring(24, 5.0, 0.0);
        let mut p2 = ring(30, 5.0, 1.0);
        p2.reorder(11);
        let delta = p1.average_spacing();
        let fast = align(&p1, &p2, delta).unwrap();
        let slow = align_with_params(&p1, &p2, delta, &AlignParams::exhaustive()).unwrap();
        assert_relative_eq!(fast.total_cost(), slow.total_cost(), epsilon = 1e-9);
    }
}
