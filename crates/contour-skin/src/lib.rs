//! Surface reconstruction from stacks of traced 2D contours.
//!
//! Given closed contours traced on parallel image layers, each a cross-section
//! of the same object, this crate builds the triangulated surface ("skin")
//! that joins them.
//!
//! # Features
//!
//! - **Resampling**: Normalise winding and bring contours to a uniform point spacing
//! - **Alignment**: Circular edit-distance matching between two contours with an
//!   unknown relative start point
//! - **Assembly**: Vertex and face buffers from aligned pairs, de-duplicated per contour
//! - **Reconstruction**: Walk linked contours of a profile group, or many groups in parallel
//!
//! # Coordinate System
//!
//! Contours lie in planes of constant Z; Z grows upward through the stack.
//! Contours are wound counter-clockwise (seen from +Z) after resampling, and
//! skin faces wind counter-clockwise when viewed from outside, so normals
//! point outward by the right-hand rule.
//!
//! # Quick Start
//!
//! ```
//! use contour_skin::{ContourId, EditKind, Mesh, Perimeter, align};
//!
//! let (xs, ys): (Vec<f64>, Vec<f64>) = (0..40)
//!     .map(|k| {
//!         let t = std::f64::consts::TAU * k as f64 / 40.0;
//!         (8.0 * t.cos(), 8.0 * t.sin())
//!     })
//!     .unzip();
//!
//! let mut lower = Perimeter::new(&xs, &ys, 0.0, true).unwrap();
//! let mut upper = Perimeter::new(&xs, &ys, 1.0, true).unwrap();
//! lower.resample(1.0).unwrap();
//! upper.resample(1.0).unwrap();
//!
//! let edits = align(&lower, &upper, 1.0).unwrap();
//! assert!(edits.iter().all(|op| op.kind == EditKind::Mutate));
//!
//! let mut mesh = Mesh::new();
//! mesh.add_skin(ContourId(1), &lower, ContourId(2), &upper, &edits).unwrap();
//! assert_eq!(mesh.face_count(), lower.len());
//! ```
//!
//! # Profile Groups
//!
//! Hosts that keep their own object graph implement [`ContourSource`];
//! [`TracedContour`] covers the rest. See [`make_mesh`] and [`make_meshes`].
//!
//! # Cargo Features
//!
//! - `config`: serde derives on the parameter types, plus
//!   [`ReconstructParams::from_json`] and [`ReconstructParams::to_json`]

mod error;
pub mod tracing_ext;

#[cfg(test)]
mod edge_cases;

pub mod align;
pub mod circular;
pub mod contour;
pub mod mesh;
pub mod perimeter;
pub mod reconstruct;
pub mod sampler;

// Re-export core types at crate root
pub use error::{ContourError, ContourResult, ErrorCode, Side};
pub use perimeter::{Perimeter, axis_extremes, is_counter_clockwise};

pub use align::{
    AlignParams, EditCounts, EditKind, EditMatrix, EditOp, EditSequence, MutationCost, align,
    align_with_params,
};
pub use circular::{CircularView, wrap};
pub use contour::{ContourId, ContourSource, TracedContour, link_chain, link_pair};
pub use mesh::{Face, Mesh};
pub use reconstruct::{
    GroupOutcome, ReconstructParams, ReconstructionReport, make_mesh, make_mesh_with_params,
    make_meshes, make_meshes_with_params,
};
pub use sampler::{ResampleParams, resample, resample_with_params};
