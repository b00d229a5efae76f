//! Mesh assembly: vertex and face buffers built from aligned perimeters.

use hashbrown::HashMap;
use nalgebra::Point3;
use tracing::debug;

use crate::align::{AlignParams, EditSequence, align_with_params};
use crate::contour::ContourId;
use crate::error::{ContourError, ContourResult, Side};
use crate::perimeter::Perimeter;

/// A face of the skin, as indices into [`Mesh::points`].
///
/// Quads are kept as emitted; use [`Mesh::triangles`] for a pure triangle list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    Triangle([u32; 3]),
    Quad([u32; 4]),
}

impl Face {
    /// Vertex indices in winding order.
    #[inline]
    pub fn indices(&self) -> &[u32] {
        match self {
            Face::Triangle(v) => v,
            Face::Quad(v) => v,
        }
    }

    /// The face as one or two triangles with the same winding.
    pub fn triangulate(&self) -> impl Iterator<Item = [u32; 3]> {
        let (first, second) = match *self {
            Face::Triangle(t) => (t, None),
            Face::Quad([a, b, c, d]) => ([a, b, c], Some([a, c, d])),
        };
        std::iter::once(first).chain(second)
    }

    fn reversed(self) -> Self {
        match self {
            Face::Triangle([a, b, c]) => Face::Triangle([c, b, a]),
            Face::Quad([a, b, c, d]) => Face::Quad([d, c, b, a]),
        }
    }
}

/// A point of P1 paired with a point of P2 by an edit operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Link {
    lower: u32,
    upper: u32,
}

/// Points and faces of a reconstructed surface.
///
/// Each perimeter contributes its points once, keyed by [`ContourId`].
/// Skins between pairs of perimeters add faces that index those points.
/// The mesh only ever grows.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    points: Vec<Point3<f64>>,
    faces: Vec<Face>,
    perimeter_index: HashMap<ContourId, u32>,
}

impl Mesh {
    /// Create a new empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// All points. Perimeters occupy contiguous runs in insertion order.
    #[inline]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// All faces, in emission order.
    #[inline]
    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of perimeters whose points have been added.
    #[inline]
    pub fn perimeter_count(&self) -> usize {
        self.perimeter_index.len()
    }

    /// Whether the mesh has no points or no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty() || self.faces.is_empty()
    }

    /// Index of the first point of a perimeter, if it has been added.
    #[inline]
    pub fn perimeter_start(&self, id: ContourId) -> Option<u32> {
        self.perimeter_index.get(&id).copied()
    }

    /// Whether a perimeter's points have been added.
    #[inline]
    pub fn contains(&self, id: ContourId) -> bool {
        self.perimeter_index.contains_key(&id)
    }

    /// Faces as triangles, quads split along their first diagonal.
    pub fn triangles(&self) -> Vec<[u32; 3]> {
        self.faces.iter().flat_map(Face::triangulate).collect()
    }

    /// Compute the axis-aligned bounding box.
    /// Returns (min_corner, max_corner) or None if there are no points.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let (first, rest) = self.points.split_first()?;
        let mut min = *first;
        let mut max = *first;
        for p in rest {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            min.z = min.z.min(p.z);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
            max.z = max.z.max(p.z);
        }
        Some((min, max))
    }

    /// Append a perimeter's points, lifted to its Z, unless already present.
    ///
    /// Returns the index of the perimeter's first point either way.
    pub fn add_perimeter(&mut self, id: ContourId, perimeter: &Perimeter) -> u32 {
        if let Some(&start) = self.perimeter_index.get(&id) {
            return start;
        }
        let start = self.points.len() as u32;
        let z = perimeter.z();
        self.points
            .extend(perimeter.points().iter().map(|p| Point3::new(p.x, p.y, z)));
        self.perimeter_index.insert(id, start);
        start
    }

    /// Emit the faces joining two perimeters along an edit sequence from
    /// [`align`](crate::align::align).
    ///
    /// Both perimeters' points are added if missing. Faces wind so that
    /// their normals point outward for counter-clockwise perimeters,
    /// whichever of the two lies above. Returns the number of faces added.
    ///
    /// # Errors
    ///
    /// Returns [`ContourError::DegenerateInput`] if the edit sequence was
    /// computed for perimeters of different sizes.
    pub fn add_skin(
        &mut self,
        id1: ContourId,
        p1: &Perimeter,
        id2: ContourId,
        p2: &Perimeter,
        edits: &EditSequence,
    ) -> ContourResult<usize> {
        if edits.len_p1() != p1.len() || edits.len_p2() != p2.len() {
            return Err(ContourError::degenerate_input(format!(
                "edit sequence aligns {} and {} points, perimeters {} and {} have {} and {}",
                edits.len_p1(),
                edits.len_p2(),
                id1,
                id2,
                p1.len(),
                p2.len()
            )));
        }
        if edits.is_empty() {
            return Ok(0);
        }

        let start1 = self.add_perimeter(id1, p1);
        let start2 = self.add_perimeter(id2, p2);
        let flip = p1.z() > p2.z();

        let links: Vec<Link> = edits
            .iter()
            .map(|op| Link {
                lower: start1 + op.i as u32,
                upper: start2 + edits.p2_index(op.j) as u32,
            })
            .collect();

        let before = self.faces.len();
        for pair in links.windows(2) {
            self.push_face(pair[0], pair[1], flip);
        }
        if p1.is_closed() && p2.is_closed() && links.len() > 1 {
            self.push_face(links[links.len() - 1], links[0], flip);
        }
        let added = self.faces.len() - before;

        debug!(
            lower = %id1,
            upper = %id2,
            operations = edits.len(),
            faces = added,
            "Added skin"
        );
        Ok(added)
    }

    /// Face between two consecutive links, if they differ.
    fn push_face(&mut self, from: Link, to: Link, flip: bool) {
        let lower_moved = from.lower != to.lower;
        let upper_moved = from.upper != to.upper;
        let face = match (lower_moved, upper_moved) {
            (true, true) => Face::Quad([from.lower, to.lower, to.upper, from.upper]),
            (true, false) => Face::Triangle([from.lower, to.lower, from.upper]),
            (false, true) => Face::Triangle([from.lower, to.upper, from.upper]),
            (false, false) => return,
        };
        self.faces.push(if flip { face.reversed() } else { face });
    }

    /// Add a perimeter and its neighbours on one side, skinning them together.
    ///
    /// With no neighbours only the perimeter's points are added. With exactly
    /// one, the two are aligned with spacing `delta` and skinned. Returns the
    /// number of faces added.
    ///
    /// # Errors
    ///
    /// - [`ContourError::UnsupportedBranchGeometry`] for more than one
    ///   neighbour; the mesh is left untouched
    /// - any error from [`align_with_params`]
    pub fn add(
        &mut self,
        id: ContourId,
        perimeter: &Perimeter,
        neighbours: &[(ContourId, &Perimeter)],
        delta: f64,
        params: &AlignParams,
    ) -> ContourResult<usize> {
        match neighbours {
            [] => {
                self.add_perimeter(id, perimeter);
                Ok(0)
            }
            [(other_id, other)] => {
                let edits = align_with_params(perimeter, other, delta, params)?;
                self.add_skin(id, perimeter, *other_id, other, &edits)
            }
            [(_, first), ..] => {
                let side = if first.z() < perimeter.z() {
                    Side::Below
                } else {
                    Side::Above
                };
                Err(ContourError::unsupported_branch(id, side, neighbours.len()))
            }
        }
    }
}
