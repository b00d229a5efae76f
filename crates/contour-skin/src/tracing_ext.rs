//! Tracing extensions for contour operations.
//!
//! This module provides structured logging and timing for resampling,
//! alignment and skinning. It integrates with the `tracing` ecosystem:
//!
//! - **Timing**: [`OperationTimer`] logs elapsed time when dropped
//! - **Structured fields**: point counts, edit counts, costs, face counts
//! - **Spans**: [`contour_span!`](crate::contour_span) for per-mesh spans
//!
//! # Usage
//!
//! Enable tracing by initializing a subscriber in your application:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, prelude::*, EnvFilter};
//!
//! tracing_subscriber::registry()
//!     .with(fmt::layer())
//!     .with(EnvFilter::from_default_env())
//!     .init();
//!
//! // Set RUST_LOG=contour_skin=debug for detailed output
//! ```
//!
//! # Log Levels
//!
//! - **ERROR**: Backtracking failures (bugs)
//! - **WARN**: Skipped contours, ignored links, failed groups
//! - **INFO**: Per-group summaries, timing
//! - **DEBUG**: Per-perimeter and per-pair progress
//! - **TRACE**: Search windows, per-step detail

use std::time::Instant;
use tracing::{Span, debug, info, warn};

use crate::align::EditSequence;
use crate::mesh::Mesh;
use crate::perimeter::Perimeter;

/// A performance timer that logs duration on drop.
///
/// # Example
///
/// ```rust,ignore
/// use contour_skin::tracing_ext::OperationTimer;
///
/// fn reconstruct_group() {
///     let _timer = OperationTimer::new("make_mesh");
///     // ... do work ...
/// } // Timer logs duration when dropped
/// ```
pub struct OperationTimer {
    name: &'static str,
    start: Instant,
    span: Span,
}

impl OperationTimer {
    /// Create a new operation timer.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!("contour_operation", operation = name);
        debug!(target: "contour_skin::timing", operation = name, "Starting operation");
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Create a timer with the number of contours involved.
    pub fn with_contours(name: &'static str, contour_count: usize) -> Self {
        let span = tracing::info_span!(
            "contour_operation",
            operation = name,
            contours = contour_count
        );
        debug!(
            target: "contour_skin::timing",
            operation = name,
            contours = contour_count,
            "Starting operation"
        );
        Self {
            name,
            start: Instant::now(),
            span,
        }
    }

    /// Get the elapsed time.
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the span for this timer.
    pub fn span(&self) -> &Span {
        &self.span
    }
}

impl Drop for OperationTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        info!(
            target: "contour_skin::timing",
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            "Operation completed"
        );
    }
}

/// Log the outcome of resampling one perimeter.
pub fn log_resample_result(perimeter: &Perimeter, input_points: usize, delta: f64) {
    debug!(
        target: "contour_skin::resample",
        input_points = input_points,
        output_points = perimeter.len(),
        delta = delta,
        average_spacing = format!("{:.4}", perimeter.average_spacing()),
        z = perimeter.z(),
        "Perimeter resampled"
    );
}

/// Log an edit sequence at debug level.
pub fn log_alignment(edits: &EditSequence) {
    let counts = edits.counts();
    debug!(
        target: "contour_skin::align",
        len_p1 = edits.len_p1(),
        len_p2 = edits.len_p2(),
        offset = edits.start_offset_p2(),
        cost = format!("{:.4}", edits.total_cost()),
        mutations = counts.mutations,
        insertions = counts.insertions,
        deletions = counts.deletions,
        "Curves aligned"
    );
}

/// Log mesh statistics at debug level.
pub fn log_mesh_stats(mesh: &Mesh, context: &str) {
    let (min_bounds, max_bounds) = mesh.bounds().unwrap_or_default();
    let dims = max_bounds - min_bounds;

    debug!(
        target: "contour_skin::mesh_state",
        context = context,
        perimeters = mesh.perimeter_count(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        dimensions = format!("{:.2} x {:.2} x {:.2}", dims.x, dims.y, dims.z),
        "Mesh state"
    );
}

/// Log a profile group that could not be reconstructed.
pub fn log_group_failure(group: usize, error: &crate::ContourError) {
    warn!(
        target: "contour_skin::reconstruct",
        group = group,
        code = error.code().as_str(),
        error = %error,
        "Profile group skipped"
    );
}

/// Macro for creating spans with common mesh fields.
#[macro_export]
macro_rules! contour_span {
    ($name:expr, $mesh:expr) => {
        tracing::info_span!(
            $name,
            vertices = $mesh.vertex_count(),
            faces = $mesh.face_count()
        )
    };
    ($name:expr, $mesh:expr, $($field:tt)*) => {
        tracing::info_span!(
            $name,
            vertices = $mesh.vertex_count(),
            faces = $mesh.face_count(),
            $($field)*
        )
    };
}
