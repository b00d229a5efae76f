//! Uniform resampling of traced contours.
//!
//! Hand-traced contours have arbitrary point density and arbitrary winding.
//! Before two contours can be aligned they must be brought to a common,
//! roughly uniform spacing `delta` and a common (counter-clockwise) winding.
//!
//! The resampler walks the input polygon greedily. Each new output point is
//! placed `delta` away from the previous one, in a direction averaged over a
//! small window of input points ahead, weighted towards the closest. The loop
//! is then closed by walking straight back to the first input point, and the
//! last few points are spread evenly over the way back so the seam is spaced
//! like the rest of the outline.
//!
//! # Example
//!
//! ```
//! use contour_skin::{Perimeter, resample};
//!
//! let n = 64;
//! let (xs, ys): (Vec<f64>, Vec<f64>) = (0..n)
//!     .map(|k| {
//!         let t = std::f64::consts::TAU * k as f64 / n as f64;
//!         (10.0 * t.cos(), 10.0 * t.sin())
//!     })
//!     .unzip();
//! let mut ring = Perimeter::new(&xs, &ys, 0.0, true).unwrap();
//!
//! resample(&mut ring, 1.0).unwrap();
//! assert!(ring.is_resampled());
//! assert_eq!(ring.points().len(), ring.directions().len());
//! ```

use nalgebra::{Point2, Vector2};
use tracing::{debug, trace};

use crate::error::{ContourError, ContourResult, check_spacing};
use crate::perimeter::{Perimeter, is_counter_clockwise};
use crate::tracing_ext::log_resample_result;

/// Distance below which an input point is treated as sitting on the last output point.
const COINCIDENT: f64 = 1e-12;

/// Parameters for [`resample_with_params`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ResampleParams {
    /// How many input points ahead of the cursor are considered for each step.
    ///
    /// Default: `6`
    pub lookahead: usize,

    /// Input points farther than `window_factor * delta` from the last output
    /// point are ignored when averaging the step direction.
    ///
    /// Default: `2.5`
    pub window_factor: f64,

    /// The closing walk stops once the last output point is within
    /// `closing_factor * delta` of the first input point.
    ///
    /// Default: `1.2`
    pub closing_factor: f64,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            lookahead: 6,
            window_factor: 2.5,
            closing_factor: 1.2,
        }
    }
}

impl ResampleParams {
    /// Set the lookahead point count (at least 1).
    #[must_use]
    pub fn with_lookahead(mut self, lookahead: usize) -> Self {
        self.lookahead = lookahead.max(1);
        self
    }

    /// Set the averaging window, as a multiple of `delta`.
    #[must_use]
    pub fn with_window_factor(mut self, factor: f64) -> Self {
        self.window_factor = factor;
        self
    }

    /// Set the closing tolerance, as a multiple of `delta`.
    #[must_use]
    pub fn with_closing_factor(mut self, factor: f64) -> Self {
        self.closing_factor = factor;
        self
    }
}

/// Resample a perimeter in place to a uniform spacing of `delta`.
///
/// Closed perimeters wound clockwise are reversed first. Calling this on a
/// perimeter that was already resampled does nothing, whatever `delta` is.
///
/// # Errors
///
/// - [`ContourError::InvalidSpacing`] if `delta` is not finite and positive
/// - [`ContourError::DegenerateInput`] if the perimeter has no points or a
///   coordinate is not finite
pub fn resample(perimeter: &mut Perimeter, delta: f64) -> ContourResult<()> {
    resample_with_params(perimeter, delta, &ResampleParams::default())
}

/// Resample a perimeter in place with custom parameters.
///
/// See [`resample`].
pub fn resample_with_params(
    perimeter: &mut Perimeter,
    delta: f64,
    params: &ResampleParams,
) -> ContourResult<()> {
    if perimeter.resampled {
        trace!(points = perimeter.len(), "Perimeter already resampled, skipping");
        return Ok(());
    }
    check_spacing(delta)?;
    if perimeter.is_empty() {
        return Err(ContourError::degenerate_input(
            "cannot resample a perimeter with no points",
        ));
    }
    if perimeter.has_non_finite() {
        return Err(ContourError::degenerate_input(
            "cannot resample a perimeter with non-finite coordinates",
        ));
    }
    if perimeter.len() == 1 {
        perimeter.resampled = true;
        return Ok(());
    }

    if perimeter.closed && !is_counter_clockwise(&perimeter.points) {
        debug!(points = perimeter.len(), "Reversing clockwise perimeter");
        perimeter.reverse();
    }

    let input_len = perimeter.len();
    let (points, directions) =
        resample_points(&perimeter.points, perimeter.closed, delta, params);

    perimeter.replace(points, directions);
    perimeter.resampled = true;
    log_resample_result(perimeter, input_len, delta);
    Ok(())
}

impl Perimeter {
    /// Resample in place with default parameters. See [`resample`].
    pub fn resample(&mut self, delta: f64) -> ContourResult<()> {
        resample(self, delta)
    }
}

/// An input point inside the averaging window.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    /// Position in the input.
    pos: usize,
    /// Distance to the last output point.
    distance: f64,
}

/// The greedy walk. `input` has at least two points and is already wound
/// counter-clockwise if closed.
fn resample_points(
    input: &[Point2<f64>],
    closed: bool,
    delta: f64,
    params: &ResampleParams,
) -> (Vec<Point2<f64>>, Vec<Vector2<f64>>) {
    let n = input.len();
    let max_distance = params.window_factor * delta;
    // Past half a closed ring the window reaches round to points behind the start.
    let reach = if closed { (n / 2).max(1) } else { n };
    let lookahead = params.lookahead.clamp(1, reach);

    let mut points = Vec::with_capacity(n);
    let mut directions = Vec::with_capacity(n);
    points.push(input[0]);
    // Filled in once the loop is closed.
    directions.push(Vector2::zeros());

    let mut candidates: Vec<Candidate> = Vec::with_capacity(lookahead);
    // Only ever moves forward; the walk is over once it passes the last input point.
    let mut cursor = 1;

    while cursor < n {
        let last = points[points.len() - 1];

        candidates.clear();
        for pos in cursor..(cursor + lookahead).min(n) {
            let distance = (input[pos] - last).norm();
            if distance < max_distance && distance > COINCIDENT {
                candidates.push(Candidate { pos, distance });
            }
        }

        if candidates.is_empty() {
            // Nothing close: head straight for the next input point.
            let target = input[cursor];
            let gap = (target - last).norm();
            if gap > COINCIDENT {
                let step = step_toward(&last, &target, delta);
                points.push(last + step);
                directions.push(step);
            }
            if gap <= delta {
                let next = (cursor..n)
                    .find(|&u| (input[u] - last).norm() > delta)
                    .unwrap_or(n);
                cursor = next.max(cursor + 1);
            }
            continue;
        }

        let weights = candidate_weights(&candidates, max_distance);
        let mut heading: Vector2<f64> = Vector2::zeros();
        for (candidate, weight) in candidates.iter().zip(&weights) {
            let to = input[candidate.pos] - last;
            let angle = to.y.atan2(to.x);
            heading += Vector2::new(angle.cos(), angle.sin()) * *weight;
        }
        let step = heading * delta;
        points.push(last + step);
        directions.push(step);

        cursor = match candidates.iter().find(|c| c.distance > delta) {
            Some(c) if c.pos != cursor => c.pos,
            // Everything in the window is already behind, or the first point
            // past delta is the cursor itself: jump past the window.
            _ => candidates[candidates.len() - 1].pos + 1,
        };
    }

    let anchor = if closed { input[0] } else { input[n - 1] };
    if closed {
        trim_overshoot(&mut points, &mut directions, &anchor);
    }

    let mut gap = (anchor - points[points.len() - 1]).norm();
    let closing_step = step_toward(&points[points.len() - 1], &anchor, delta);
    while gap > params.closing_factor * delta {
        let next = points[points.len() - 1] + closing_step;
        points.push(next);
        directions.push(closing_step);
        gap = (anchor - next).norm();
    }

    if closed {
        respace_seam(
            &mut points,
            &mut directions,
            &anchor,
            delta,
            params.closing_factor,
        );
        // The wrap-around vector only covers the remaining gap, so it never
        // overshoots the first point.
        directions[0] = anchor - points[points.len() - 1];
    }

    (points, directions)
}

/// Output points re-spaced on the way back to the first point.
const SEAM_TAIL: usize = 4;

/// Drop trailing points the walk carried past `anchor`.
///
/// A point has gone past when `anchor` lies behind the step that reached it.
fn trim_overshoot(
    points: &mut Vec<Point2<f64>>,
    directions: &mut Vec<Vector2<f64>>,
    anchor: &Point2<f64>,
) {
    while points.len() > 2 {
        let last = points[points.len() - 1];
        if (anchor - last).dot(&directions[directions.len() - 1]) >= 0.0 {
            break;
        }
        points.pop();
        directions.pop();
    }
}

/// Spread the last [`SEAM_TAIL`] points evenly along the path from the point
/// before them to `anchor`. No spacing along that path ends up longer than
/// `max_factor * delta`.
fn respace_seam(
    points: &mut Vec<Point2<f64>>,
    directions: &mut Vec<Vector2<f64>>,
    anchor: &Point2<f64>,
    delta: f64,
    max_factor: f64,
) {
    if points.len() <= SEAM_TAIL + 1 {
        return;
    }
    let fixed = points.len() - 1 - SEAM_TAIL;
    let mut path = points[fixed..].to_vec();
    path.push(*anchor);
    let lengths: Vec<f64> = path.windows(2).map(|w| (w[1] - w[0]).norm()).collect();
    let total: f64 = lengths.iter().sum();

    let mut count = ((total / delta).round() as usize).max(1);
    if total / count as f64 > max_factor * delta {
        count += 1;
    }

    points.truncate(fixed + 1);
    directions.truncate(fixed + 1);

    let mut seg = 0;
    let mut walked = 0.0;
    for q in 1..count {
        let target = total * q as f64 / count as f64;
        while seg + 1 < lengths.len() && target > walked + lengths[seg] {
            walked += lengths[seg];
            seg += 1;
        }
        let t = if lengths[seg] > 0.0 {
            ((target - walked) / lengths[seg]).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let next = path[seg] + (path[seg + 1] - path[seg]) * t;
        let prev = points[points.len() - 1];
        points.push(next);
        directions.push(next - prev);
    }
}

/// A step of length `delta` from `from` towards `to`.
fn step_toward(from: &Point2<f64>, to: &Point2<f64>, delta: f64) -> Vector2<f64> {
    let d = to - from;
    let angle = d.y.atan2(d.x);
    Vector2::new(angle.cos(), angle.sin()) * delta
}

/// Weights `1 - d / max_distance`, normalised to sum to exactly one.
///
/// The closest candidate absorbs whatever rounding slack is left.
fn candidate_weights(candidates: &[Candidate], max_distance: f64) -> Vec<f64> {
    let mut weights: Vec<f64> = candidates
        .iter()
        .map(|c| 1.0 - c.distance / max_distance)
        .collect();
    let sum: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= sum;
    }

    let closest = candidates
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.distance.total_cmp(&b.1.distance))
        .map(|(k, _)| k)
        .unwrap_or(0);
    let normalised: f64 = weights.iter().sum();
    weights[closest] += 1.0 - normalised;
    weights
}
