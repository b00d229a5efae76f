//! Contour sources: how traced contours and their links come in from the host.
//!
//! The host application owns the object graph. A contour knows its own
//! coordinates, its layer depth, and which contours on other layers it is
//! directly linked to. Reconstruction only ever reads through
//! [`ContourSource`].

use std::fmt;

use hashbrown::HashSet;

use crate::error::ContourResult;
use crate::perimeter::Perimeter;

/// Identity of a contour in the host graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct ContourId(pub u64);

impl fmt::Display for ContourId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ContourId {
    fn from(id: u64) -> Self {
        ContourId(id)
    }
}

/// A traced contour as seen by the reconstruction driver.
pub trait ContourSource {
    /// Identity of this contour.
    fn id(&self) -> ContourId;

    /// Coordinates as parallel x and y arrays.
    fn points(&self) -> (Vec<f64>, Vec<f64>);

    /// Depth of the layer the contour was traced on.
    fn z(&self) -> f64;

    /// Contours this one is directly linked to, on any layer.
    ///
    /// `None` means the contour has never been linked. An empty set is a
    /// contour whose links were all removed; both end up without a skin.
    fn directly_linked(&self) -> Option<HashSet<ContourId>>;

    /// Build a closed [`Perimeter`] from this contour.
    fn to_perimeter(&self) -> ContourResult<Perimeter> {
        let (x, y) = self.points();
        Perimeter::new(&x, &y, self.z(), true)
    }
}

impl<C: ContourSource + ?Sized> ContourSource for &C {
    fn id(&self) -> ContourId {
        (**self).id()
    }

    fn points(&self) -> (Vec<f64>, Vec<f64>) {
        (**self).points()
    }

    fn z(&self) -> f64 {
        (**self).z()
    }

    fn directly_linked(&self) -> Option<HashSet<ContourId>> {
        (**self).directly_linked()
    }
}

/// An in-memory contour with its own link list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Serialize, serde::Deserialize))]
pub struct TracedContour {
    pub id: ContourId,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: f64,
    pub links: Option<Vec<ContourId>>,
}

impl TracedContour {
    /// Create an unlinked contour.
    pub fn new(id: u64, x: Vec<f64>, y: Vec<f64>, z: f64) -> Self {
        Self {
            id: ContourId(id),
            x,
            y,
            z,
            links: None,
        }
    }

    /// Create an unlinked contour from `(x, y)` pairs.
    pub fn from_xy(id: u64, points: &[(f64, f64)], z: f64) -> Self {
        let (x, y) = points.iter().copied().unzip();
        Self::new(id, x, y, z)
    }

    /// Add a link to another contour. Duplicates are harmless.
    pub fn link(&mut self, other: ContourId) {
        self.links.get_or_insert_with(Vec::new).push(other);
    }

    /// Builder form of [`link`](Self::link).
    #[must_use]
    pub fn linked_to(mut self, other: ContourId) -> Self {
        self.link(other);
        self
    }
}

impl ContourSource for TracedContour {
    fn id(&self) -> ContourId {
        self.id
    }

    fn points(&self) -> (Vec<f64>, Vec<f64>) {
        (self.x.clone(), self.y.clone())
    }

    fn z(&self) -> f64 {
        self.z
    }

    fn directly_linked(&self) -> Option<HashSet<ContourId>> {
        self.links
            .as_ref()
            .map(|links| links.iter().copied().collect())
    }
}

/// Link two contours to each other.
pub fn link_pair(a: &mut TracedContour, b: &mut TracedContour) {
    a.link(b.id);
    b.link(a.id);
}

/// Link a stack of contours in order, each to the next.
pub fn link_chain(contours: &mut [TracedContour]) {
    for k in 1..contours.len() {
        let (lower, upper) = contours.split_at_mut(k);
        link_pair(&mut lower[k - 1], &mut upper[0]);
    }
}
