//! The edit matrix: minimum cost of turning a prefix of one curve into a
//! prefix of another.
//!
//! Row `i` covers the first `i` points of P1, column `j` the first `j` points
//! of P2 rotated to start at `first`. Deleting or inserting a point costs
//! `delta`; mutating one point into another costs their distance under the
//! configured [`MutationCost`]. The last row and column relax the mutation
//! to free, so the final cell does not pay for the seam at the start point.

use nalgebra::{Point2, Vector2};

use crate::circular::CircularView;
use crate::perimeter::Perimeter;

/// How much it costs to match a point of P1 with a point of P2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub enum MutationCost {
    /// Euclidean distance between the two points.
    #[default]
    PointDistance,
    /// Distance between the direction vectors of the two points.
    ///
    /// Insensitive to translation between layers, which suits stacks that
    /// were not registered before tracing.
    DirectionDifference,
}

impl MutationCost {
    /// Cost of matching `p1[i]` with `p2[j]`.
    #[inline]
    pub fn between(&self, p1: &Perimeter, i: usize, p2: &Perimeter, j: usize) -> f64 {
        match self {
            MutationCost::PointDistance => point_distance(&p1.points()[i], &p2.points()[j]),
            MutationCost::DirectionDifference => {
                direction_difference(&p1.directions()[i], &p2.directions()[j])
            }
        }
    }
}

#[inline]
fn point_distance(a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a - b).norm()
}

#[inline]
fn direction_difference(a: &Vector2<f64>, b: &Vector2<f64>) -> f64 {
    (a - b).norm()
}

/// A filled `(n + 1) x (m + 1)` edit matrix for one rotation of P2.
#[derive(Debug, Clone)]
pub struct EditMatrix {
    values: Vec<f64>,
    rows: usize,
    cols: usize,
    first: usize,
    delta: f64,
    cost: MutationCost,
}

impl EditMatrix {
    /// Fill the matrix for P2 rotated so that `first` is its index 0.
    pub fn compute(
        p1: &Perimeter,
        p2: &Perimeter,
        first: usize,
        delta: f64,
        cost: MutationCost,
    ) -> Self {
        let mut matrix = Self::empty(cost);
        matrix.fill(p1, p2, first, delta);
        matrix
    }

    /// A zero-sized matrix, used as a scratch buffer before the first fill.
    pub(crate) fn empty(cost: MutationCost) -> Self {
        Self {
            values: Vec::new(),
            rows: 0,
            cols: 0,
            first: 0,
            delta: 0.0,
            cost,
        }
    }

    /// Refill in place, reusing the allocation.
    pub(crate) fn fill(&mut self, p1: &Perimeter, p2: &Perimeter, first: usize, delta: f64) {
        let n = p1.len();
        let m = p2.len();
        self.rows = n + 1;
        self.cols = m + 1;
        self.first = if m == 0 { 0 } else { first % m };
        self.delta = delta;
        self.values.clear();
        self.values.resize(self.rows * self.cols, 0.0);

        for i in 0..=n {
            self.set(i, 0, i as f64 * delta);
        }
        for j in 0..=m {
            self.set(0, j, j as f64 * delta);
        }

        for i in 1..=n {
            for j in 1..=m {
                let deletion = self.get(i - 1, j) + delta;
                let insertion = self.get(i, j - 1) + delta;
                let mutation = self.mutation(p1, p2, i, j);
                let value = if mutation <= deletion && mutation <= insertion {
                    mutation
                } else if deletion <= insertion {
                    deletion
                } else {
                    insertion
                };
                self.set(i, j, value);
            }
        }
    }

    /// Value of the mutation branch at cell `(i, j)`, both at least 1.
    pub(crate) fn mutation(&self, p1: &Perimeter, p2: &Perimeter, i: usize, j: usize) -> f64 {
        let n = self.rows - 1;
        let m = self.cols - 1;
        let diagonal = self.get(i - 1, j - 1);
        if i == n || j == m {
            diagonal
        } else {
            let rotated = CircularView::new(p2.points(), self.first);
            diagonal + self.cost.between(p1, i - 1, p2, rotated.source_index(j - 1))
        }
    }

    /// Cell `(i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the cell is outside the matrix.
    #[inline]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.rows && j < self.cols, "cell ({i}, {j}) out of bounds");
        self.values[i * self.cols + j]
    }

    #[inline]
    fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.cols + j] = value;
    }

    /// Cost of the whole alignment, cell `(n, m)`.
    #[inline]
    pub fn final_cost(&self) -> f64 {
        self.get(self.rows - 1, self.cols - 1)
    }

    /// `n + 1`.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// `m + 1`.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Rotation of P2 this matrix was filled for.
    #[inline]
    pub fn first(&self) -> usize {
        self.first
    }

    /// Insertion and deletion cost.
    #[inline]
    pub fn delta(&self) -> f64 {
        self.delta
    }
}
