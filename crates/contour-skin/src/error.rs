//! Error types for contour resampling, alignment and skinning.
//!
//! Every error carries a machine-readable code in the format `CONTOUR-XXXX`:
//! - `CONTOUR-2xxx`: Input errors (degenerate contours, bad spacing)
//! - `CONTOUR-3xxx`: Graph errors (unlinked contours, branching)
//! - `CONTOUR-9xxx`: Internal errors (should never happen)
//!
//! Errors are scoped: a failure on one perimeter pair or profile group never
//! aborts the rest of a batch. See [`crate::reconstruct::make_meshes`].
//!
//! # Example
//!
//! ```
//! use contour_skin::{ContourError, ErrorCode};
//!
//! let err = ContourError::degenerate_input("profile group has a single contour");
//! assert_eq!(err.code(), ErrorCode::DegenerateInput);
//! assert_eq!(err.code().as_str(), "CONTOUR-2001");
//! ```

use miette::Diagnostic;
use thiserror::Error;

use crate::contour::ContourId;

/// Result type alias for contour operations.
pub type ContourResult<T> = Result<T, ContourError>;

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// CONTOUR-2001: Perimeter or profile group has too few points/contours
    DegenerateInput = 2001,
    /// CONTOUR-2002: Spacing is zero, negative, or not finite
    InvalidSpacing = 2002,
    /// CONTOUR-2003: Coordinate arrays have different lengths
    LengthMismatch = 2003,

    /// CONTOUR-3001: Contour has no recorded links
    UnlinkedContour = 3001,
    /// CONTOUR-3002: More than one neighbour on one side of a contour
    UnsupportedBranchGeometry = 3002,

    /// CONTOUR-9001: Backtracking could not reproduce a matrix cell
    NumericToleranceMiss = 9001,
}

impl ErrorCode {
    /// Returns the error code as a string in the format `CONTOUR-XXXX`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DegenerateInput => "CONTOUR-2001",
            ErrorCode::InvalidSpacing => "CONTOUR-2002",
            ErrorCode::LengthMismatch => "CONTOUR-2003",
            ErrorCode::UnlinkedContour => "CONTOUR-3001",
            ErrorCode::UnsupportedBranchGeometry => "CONTOUR-3002",
            ErrorCode::NumericToleranceMiss => "CONTOUR-9001",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which side of a perimeter, in Z, a group of neighbours lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Neighbours with a lower Z.
    Below,
    /// Neighbours with a higher Z.
    Above,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Below => write!(f, "below"),
            Side::Above => write!(f, "above"),
        }
    }
}

/// Errors that can occur while resampling, aligning, or skinning contours.
#[derive(Debug, Error, Diagnostic)]
pub enum ContourError {
    /// A perimeter has no points, or a profile group has fewer than two contours.
    #[error("degenerate input: {details}")]
    #[diagnostic(
        code(contour::input::degenerate),
        help("A skin needs at least two non-empty contours on different layers.")
    )]
    DegenerateInput { details: String },

    /// The resampling spacing is unusable.
    #[error("invalid point spacing: {delta}")]
    #[diagnostic(
        code(contour::input::spacing),
        help("The spacing must be a finite, strictly positive distance in contour units.")
    )]
    InvalidSpacing { delta: f64 },

    /// The x and y coordinate arrays of a contour differ in length.
    #[error("coordinate arrays differ in length: {x_len} x values, {y_len} y values")]
    #[diagnostic(code(contour::input::length_mismatch))]
    LengthMismatch { x_len: usize, y_len: usize },

    /// A contour expected to participate in a skin has no recorded links.
    #[error("contour {contour} is unlinked")]
    #[diagnostic(
        code(contour::graph::unlinked),
        help("Link the contour to its neighbours on adjacent layers, or remove it from the group.")
    )]
    UnlinkedContour { contour: ContourId },

    /// More than one neighbour on the same side requires merging, which is not supported.
    #[error(
        "contour {contour} has {neighbours} linked contours {side} it; branched skinning is not supported"
    )]
    #[diagnostic(
        code(contour::graph::branch),
        help("Split the profile group so that every contour has at most one neighbour per side.")
    )]
    UnsupportedBranchGeometry {
        contour: ContourId,
        side: Side,
        neighbours: usize,
    },

    /// Backtracking through the edit matrix failed to match any recurrence branch.
    ///
    /// This indicates that the forward and backward cost formulas disagree,
    /// which is a bug rather than a property of the input.
    #[error("edit matrix backtracking found no matching branch at cell ({i}, {j})")]
    #[diagnostic(code(contour::internal::tolerance))]
    NumericToleranceMiss { i: usize, j: usize },
}

impl ContourError {
    /// Returns the machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            ContourError::DegenerateInput { .. } => ErrorCode::DegenerateInput,
            ContourError::InvalidSpacing { .. } => ErrorCode::InvalidSpacing,
            ContourError::LengthMismatch { .. } => ErrorCode::LengthMismatch,
            ContourError::UnlinkedContour { .. } => ErrorCode::UnlinkedContour,
            ContourError::UnsupportedBranchGeometry { .. } => {
                ErrorCode::UnsupportedBranchGeometry
            }
            ContourError::NumericToleranceMiss { .. } => ErrorCode::NumericToleranceMiss,
        }
    }

    /// Whether this error points at a defect in this crate rather than in the input.
    pub fn is_bug(&self) -> bool {
        matches!(self, ContourError::NumericToleranceMiss { .. })
    }

    // Constructor helpers for common error patterns

    /// Create a DegenerateInput error.
    pub fn degenerate_input(details: impl Into<String>) -> Self {
        ContourError::DegenerateInput {
            details: details.into(),
        }
    }

    /// Create an InvalidSpacing error.
    pub fn invalid_spacing(delta: f64) -> Self {
        ContourError::InvalidSpacing { delta }
    }

    /// Create an UnlinkedContour error.
    pub fn unlinked(contour: ContourId) -> Self {
        ContourError::UnlinkedContour { contour }
    }

    /// Create an UnsupportedBranchGeometry error.
    pub fn unsupported_branch(contour: ContourId, side: Side, neighbours: usize) -> Self {
        ContourError::UnsupportedBranchGeometry {
            contour,
            side,
            neighbours,
        }
    }
}

/// Check that a spacing is finite and strictly positive.
pub(crate) fn check_spacing(delta: f64) -> ContourResult<()> {
    if delta.is_finite() && delta > 0.0 {
        Ok(())
    } else {
        Err(ContourError::invalid_spacing(delta))
    }
}
