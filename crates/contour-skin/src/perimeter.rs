//! The perimeter: one traced contour on one layer.

use std::sync::OnceLock;

use nalgebra::{Point2, Vector2};

use crate::circular::wrap;
use crate::error::{ContourError, ContourResult};

/// A closed (or open) polygonal curve lying in the plane `z = const`.
///
/// Points are stored in order; for closed curves the last point connects back
/// to the first. `directions[i]` is the displacement that reaches `points[i]`
/// from the previous point, so `points.len() == directions.len()` always holds.
///
/// Perimeters are built once from a traced contour and then resampled in
/// place by [`crate::sampler::resample`]. Resampling is one-way and runs at
/// most once.
#[derive(Debug, Clone)]
pub struct Perimeter {
    pub(crate) points: Vec<Point2<f64>>,
    pub(crate) directions: Vec<Vector2<f64>>,
    pub(crate) z: f64,
    pub(crate) closed: bool,
    pub(crate) resampled: bool,
    average_spacing: OnceLock<f64>,
}

impl Perimeter {
    /// Create a perimeter from parallel coordinate arrays.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::LengthMismatch`] if `x` and `y` differ in length.
    pub fn new(x: &[f64], y: &[f64], z: f64, closed: bool) -> ContourResult<Self> {
        if x.len() != y.len() {
            return Err(ContourError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            });
        }
        let points = x
            .iter()
            .zip(y)
            .map(|(&px, &py)| Point2::new(px, py))
            .collect();
        Ok(Self::from_points(points, z, closed))
    }

    /// Create a perimeter from points.
    pub fn from_points(points: Vec<Point2<f64>>, z: f64, closed: bool) -> Self {
        let directions = raw_directions(&points, closed);
        Self {
            points,
            directions,
            z,
            closed,
            resampled: false,
            average_spacing: OnceLock::new(),
        }
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the perimeter has no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The points, in order.
    #[inline]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Per-point direction vectors, parallel to [`points`](Self::points).
    #[inline]
    pub fn directions(&self) -> &[Vector2<f64>] {
        &self.directions
    }

    /// Depth of the layer this perimeter lies on.
    #[inline]
    pub fn z(&self) -> f64 {
        self.z
    }

    /// Whether the last point connects back to the first.
    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether [`resample`](Self::resample) has already run.
    #[inline]
    pub fn is_resampled(&self) -> bool {
        self.resampled
    }

    /// Mean distance between consecutive points, including the closing
    /// segment of a closed curve. Computed on first use and cached.
    ///
    /// Returns 0 for perimeters with fewer than two points.
    pub fn average_spacing(&self) -> f64 {
        *self.average_spacing.get_or_init(|| {
            let segments = self.segment_count();
            if segments == 0 {
                0.0
            } else {
                self.perimeter_length() / segments as f64
            }
        })
    }

    /// Total length of the polyline (closing segment included when closed).
    pub fn perimeter_length(&self) -> f64 {
        let open_length: f64 = self
            .points
            .windows(2)
            .map(|w| (w[1] - w[0]).norm())
            .sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) if self.points.len() > 1 => {
                open_length + (first - last).norm()
            }
            _ => open_length,
        }
    }

    fn segment_count(&self) -> usize {
        match self.points.len() {
            0 | 1 => 0,
            n if self.closed => n,
            n => n - 1,
        }
    }

    /// Rotate a closed perimeter so that point `start` becomes index 0.
    ///
    /// Directions rotate with their points. Open perimeters are left untouched.
    pub fn reorder(&mut self, start: usize) {
        if !self.closed || self.points.is_empty() {
            return;
        }
        let start = wrap(start as isize, self.points.len());
        self.points.rotate_left(start);
        self.directions.rotate_left(start);
    }

    /// Whether any coordinate is NaN or infinite.
    pub(crate) fn has_non_finite(&self) -> bool {
        self.points
            .iter()
            .any(|p| !p.x.is_finite() || !p.y.is_finite())
    }

    /// Replace points and directions wholesale, invalidating cached values.
    pub(crate) fn replace(&mut self, points: Vec<Point2<f64>>, directions: Vec<Vector2<f64>>) {
        debug_assert_eq!(points.len(), directions.len());
        self.points = points;
        self.directions = directions;
        self.average_spacing = OnceLock::new();
    }

    /// Reverse the point order in place, recomputing raw directions.
    pub(crate) fn reverse(&mut self) {
        self.points.reverse();
        self.directions = raw_directions(&self.points, self.closed);
        self.average_spacing = OnceLock::new();
    }
}

/// Displacements from each point's predecessor. The first entry wraps for
/// closed curves and is zero for open ones.
fn raw_directions(points: &[Point2<f64>], closed: bool) -> Vec<Vector2<f64>> {
    let n = points.len();
    (0..n)
        .map(|i| {
            if i == 0 && !closed {
                Vector2::zeros()
            } else {
                points[i] - points[wrap(i as isize - 1, n)]
            }
        })
        .collect()
}

/// Indices of the axis-extreme points: `[max_x, max_y, min_x, min_y]`.
///
/// The first occurrence wins on ties. Returns `None` for an empty slice.
pub fn axis_extremes(points: &[Point2<f64>]) -> Option<[usize; 4]> {
    if points.is_empty() {
        return None;
    }
    let mut ext = [0usize; 4];
    for (i, p) in points.iter().enumerate().skip(1) {
        if p.x > points[ext[0]].x {
            ext[0] = i;
        }
        if p.y > points[ext[1]].y {
            ext[1] = i;
        }
        if p.x < points[ext[2]].x {
            ext[2] = i;
        }
        if p.y < points[ext[3]].y {
            ext[3] = i;
        }
    }
    Some(ext)
}

/// Winding test on the cyclic order of the four axis extremes.
///
/// Walking a counter-clockwise polygon (y axis up) visits max-x, max-y,
/// min-x and min-y in that cyclic order, so exactly one of the four steps
/// around that cycle goes backwards in index. Any other count means the
/// polygon is wound clockwise.
///
/// Polygons with fewer than three points count as counter-clockwise.
pub fn is_counter_clockwise(points: &[Point2<f64>]) -> bool {
    if points.len() < 3 {
        return true;
    }
    let Some(ext) = axis_extremes(points) else {
        return true;
    };
    let ascending = (0..4).filter(|&k| ext[(k + 1) % 4] >= ext[k]).count();
    ascending == 3
}
