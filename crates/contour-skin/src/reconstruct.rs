//! Reconstruction of whole profile groups.
//!
//! A profile group is a set of contours traced through one object, linked
//! to each other across layers. [`make_mesh`] resamples every contour to a
//! shared spacing, walks the links from the lowest layer upward and skins
//! each linked pair once. [`make_meshes`] does the same for many groups in
//! parallel, keeping failures scoped to their group.
//!
//! # Example
//!
//! ```
//! use contour_skin::{TracedContour, link_chain, make_mesh};
//!
//! let ring = |id: u64, z: f64| {
//!     let points: Vec<(f64, f64)> = (0..32)
//!         .map(|k| {
//!             let t = std::f64::consts::TAU * k as f64 / 32.0;
//!             (5.0 * t.cos(), 5.0 * t.sin())
//!         })
//!         .collect();
//!     TracedContour::from_xy(id, &points, z)
//! };
//! let mut stack = vec![ring(1, 0.0), ring(2, 1.0), ring(3, 2.0)];
//! link_chain(&mut stack);
//!
//! let mesh = make_mesh(&stack).unwrap();
//! assert_eq!(mesh.perimeter_count(), 3);
//! assert!(mesh.face_count() > 0);
//! ```

use std::fmt;

use hashbrown::{HashMap, HashSet};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::align::AlignParams;
use crate::contour::{ContourId, ContourSource};
use crate::error::{ContourError, ContourResult, ErrorCode, Side, check_spacing};
use crate::mesh::Mesh;
use crate::perimeter::Perimeter;
use crate::sampler::{ResampleParams, resample_with_params};
use crate::tracing_ext::{OperationTimer, log_group_failure, log_mesh_stats};

// =========================================================================
// Parameters
// =========================================================================

/// Parameters for reconstructing a profile group.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ReconstructParams {
    /// Spacing all perimeters are resampled to, also the cost of one
    /// insertion or deletion during alignment.
    ///
    /// Default: `None`, the mean of the perimeters' own average spacings.
    #[cfg_attr(feature = "config", serde(default))]
    pub delta: Option<f64>,

    /// Resampling parameters.
    #[cfg_attr(feature = "config", serde(default))]
    pub resample: ResampleParams,

    /// Alignment parameters.
    #[cfg_attr(feature = "config", serde(default))]
    pub align: AlignParams,
}

impl ReconstructParams {
    /// Resample every group to the same fixed spacing.
    pub fn fixed_spacing(delta: f64) -> Self {
        Self {
            delta: Some(delta),
            ..Default::default()
        }
    }

    /// Match points by direction, for stacks whose layers were not registered.
    pub fn translation_invariant() -> Self {
        Self {
            align: AlignParams::translation_invariant(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        self.delta = Some(delta);
        self
    }

    #[must_use]
    pub fn with_resample(mut self, resample: ResampleParams) -> Self {
        self.resample = resample;
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: AlignParams) -> Self {
        self.align = align;
        self
    }

    /// Load parameters from a JSON string. Missing fields take their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json_str)
    }

    /// Serialize to JSON string.
    #[cfg(feature = "config")]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// =========================================================================
// Single group
// =========================================================================

/// A usable contour of the group being reconstructed.
struct Layer {
    id: ContourId,
    perimeter: Perimeter,
    links: Option<HashSet<ContourId>>,
}

/// Reconstruct one profile group with default parameters.
///
/// # Errors
///
/// - [`ContourError::DegenerateInput`] if fewer than two contours have points
/// - [`ContourError::UnlinkedContour`] if a contour was never linked
/// - [`ContourError::UnsupportedBranchGeometry`] if a contour links to more
///   than one contour on the same side
/// - any resampling or alignment error
pub fn make_mesh<C: ContourSource>(contours: &[C]) -> ContourResult<Mesh> {
    make_mesh_with_params(contours, &ReconstructParams::default())
}

/// Reconstruct one profile group with custom parameters. See [`make_mesh`].
pub fn make_mesh_with_params<C: ContourSource>(
    contours: &[C],
    params: &ReconstructParams,
) -> ContourResult<Mesh> {
    let timer = OperationTimer::with_contours("make_mesh", contours.len());
    let _guard = timer.span().enter();

    if contours.len() < 2 {
        return Err(ContourError::degenerate_input(format!(
            "profile group has {} contour(s), a skin needs at least two",
            contours.len()
        )));
    }

    let mut layers = collect_layers(contours)?;
    if layers.len() < 2 {
        return Err(ContourError::degenerate_input(format!(
            "profile group has {} contour(s) with points, a skin needs at least two",
            layers.len()
        )));
    }

    let delta = match params.delta {
        Some(delta) => delta,
        None => {
            layers
                .iter()
                .map(|l| l.perimeter.average_spacing())
                .sum::<f64>()
                / layers.len() as f64
        }
    };
    check_spacing(delta)?;
    debug!(delta, contours = layers.len(), "Shared spacing chosen");

    for layer in &mut layers {
        resample_with_params(&mut layer.perimeter, delta, &params.resample)?;
    }

    let mesh = skin_layers(&layers, delta, &params.align)?;
    log_mesh_stats(&mesh, "make_mesh");
    Ok(mesh)
}

/// Turn contours into perimeters, dropping empty ones and duplicate ids.
fn collect_layers<C: ContourSource>(contours: &[C]) -> ContourResult<Vec<Layer>> {
    let mut seen = HashSet::with_capacity(contours.len());
    let mut layers = Vec::with_capacity(contours.len());
    for contour in contours {
        let id = contour.id();
        let perimeter = contour.to_perimeter()?;
        if perimeter.is_empty() {
            warn!(contour = %id, "Skipping contour with no points");
            continue;
        }
        if !seen.insert(id) {
            warn!(contour = %id, "Skipping duplicate contour");
            continue;
        }
        layers.push(Layer {
            id,
            perimeter,
            links: contour.directly_linked(),
        });
    }
    Ok(layers)
}

/// Walk the link graph from the lowest layer and skin every linked pair once.
fn skin_layers(layers: &[Layer], delta: f64, params: &AlignParams) -> ContourResult<Mesh> {
    let index: HashMap<ContourId, usize> =
        layers.iter().enumerate().map(|(k, l)| (l.id, k)).collect();

    let mut order: Vec<usize> = (0..layers.len()).collect();
    order.sort_by(|&a, &b| {
        layers[a]
            .perimeter
            .z()
            .total_cmp(&layers[b].perimeter.z())
            .then(layers[a].id.cmp(&layers[b].id))
    });

    let mut mesh = Mesh::new();
    let mut visited: HashSet<usize> = HashSet::with_capacity(layers.len());
    let mut skinned: HashSet<(ContourId, ContourId)> = HashSet::new();
    let mut components = 0;

    for &root in &order {
        if !visited.insert(root) {
            continue;
        }
        components += 1;
        let _span =
            crate::contour_span!("skin_component", mesh, root = %layers[root].id).entered();
        let mut pending = vec![root];

        while let Some(current) = pending.pop() {
            let layer = &layers[current];
            let (below, above) = classify_neighbours(layers, &index, current)?;

            for (side, group) in [(Side::Below, below), (Side::Above, above)] {
                if group.len() > 1 {
                    return Err(ContourError::unsupported_branch(layer.id, side, group.len()));
                }
                let fresh: Vec<(ContourId, &Perimeter)> = group
                    .iter()
                    .filter(|&&other| !skinned.contains(&pair_key(layer.id, layers[other].id)))
                    .map(|&other| (layers[other].id, &layers[other].perimeter))
                    .collect();
                mesh.add(layer.id, &layer.perimeter, &fresh, delta, params)?;

                for &other in &group {
                    skinned.insert(pair_key(layer.id, layers[other].id));
                    if visited.insert(other) {
                        pending.push(other);
                    }
                }
            }
        }
    }

    info!(
        contours = layers.len(),
        components,
        skins = skinned.len(),
        vertices = mesh.vertex_count(),
        faces = mesh.face_count(),
        "Profile group reconstructed"
    );
    Ok(mesh)
}

/// Split a layer's links into neighbours below and above it, sorted by id.
///
/// Links to contours outside the group and to contours on the same layer
/// are ignored.
fn classify_neighbours(
    layers: &[Layer],
    index: &HashMap<ContourId, usize>,
    current: usize,
) -> ContourResult<(Vec<usize>, Vec<usize>)> {
    let layer = &layers[current];
    let links = layer
        .links
        .as_ref()
        .ok_or_else(|| ContourError::unlinked(layer.id))?;

    let mut linked: Vec<ContourId> = links.iter().copied().collect();
    linked.sort_unstable();

    let mut below = Vec::new();
    let mut above = Vec::new();
    for id in linked {
        let Some(&other) = index.get(&id) else {
            warn!(contour = %layer.id, link = %id, "Ignoring link to a contour outside the group");
            continue;
        };
        if other == current {
            continue;
        }
        let z = layers[other].perimeter.z();
        if z == layer.perimeter.z() {
            debug!(contour = %layer.id, link = %id, "Ignoring link on the same layer");
        } else if z < layer.perimeter.z() {
            below.push(other);
        } else {
            above.push(other);
        }
    }
    Ok((below, above))
}

fn pair_key(a: ContourId, b: ContourId) -> (ContourId, ContourId) {
    if a <= b { (a, b) } else { (b, a) }
}

// =========================================================================
// Batches
// =========================================================================

/// Result of reconstructing one group of a batch.
#[derive(Debug)]
pub struct GroupOutcome {
    /// Position of the group in the batch.
    pub group: usize,
    /// The mesh, or why the group was skipped.
    pub result: ContourResult<Mesh>,
}

impl GroupOutcome {
    /// Whether the group produced a mesh.
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// The mesh, if the group produced one.
    pub fn mesh(&self) -> Option<&Mesh> {
        self.result.as_ref().ok()
    }

    /// The error, if the group failed.
    pub fn error(&self) -> Option<&ContourError> {
        self.result.as_ref().err()
    }
}

/// Reconstruct many profile groups in parallel with default parameters.
///
/// Outcomes come back in group order. A failing group is logged and
/// reported in its outcome; the others are unaffected.
pub fn make_meshes<C: ContourSource + Sync>(groups: &[Vec<C>]) -> Vec<GroupOutcome> {
    make_meshes_with_params(groups, &ReconstructParams::default())
}

/// Reconstruct many profile groups in parallel. See [`make_meshes`].
pub fn make_meshes_with_params<C: ContourSource + Sync>(
    groups: &[Vec<C>],
    params: &ReconstructParams,
) -> Vec<GroupOutcome> {
    let _timer = OperationTimer::new("make_meshes");
    groups
        .par_iter()
        .enumerate()
        .map(|(group, contours)| {
            let result = make_mesh_with_params(contours, params);
            if let Err(e) = &result {
                log_group_failure(group, e);
            }
            GroupOutcome { group, result }
        })
        .collect()
}

/// Summary of a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconstructionReport {
    /// Number of groups in the batch.
    pub groups: usize,
    /// Groups that produced a mesh.
    pub built: usize,
    /// Failed groups with their error codes.
    pub failures: Vec<(usize, ErrorCode)>,
    /// Points across all built meshes.
    pub vertices: usize,
    /// Faces across all built meshes.
    pub faces: usize,
}

impl ReconstructionReport {
    /// Summarise a batch of outcomes.
    pub fn from_outcomes(outcomes: &[GroupOutcome]) -> Self {
        let mut report = Self {
            groups: outcomes.len(),
            ..Default::default()
        };
        for outcome in outcomes {
            match &outcome.result {
                Ok(mesh) => {
                    report.built += 1;
                    report.vertices += mesh.vertex_count();
                    report.faces += mesh.face_count();
                }
                Err(e) => report.failures.push((outcome.group, e.code())),
            }
        }
        report
    }

    /// Number of failed groups.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Whether every group produced a mesh.
    pub fn all_built(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for ReconstructionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} groups built, {} vertices, {} faces",
            self.built, self.groups, self.vertices, self.faces
        )?;
        for (group, code) in &self.failures {
            write!(f, "\n  group {}: {}", group, code)?;
        }
        Ok(())
    }
}
