use rstar::{Envelope, PointDistance, RTree, RTreeObject, AABB};

use crate::geometry::{Point, PointExtent};
use crate::scene::GeometryId;

/// An entry in the R-tree: the device-space extent one geometry drew into.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtentEntry {
    pub geometry: GeometryId,
    pub extent: PointExtent,
}

impl RTreeObject for ExtentEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.extent.min.x, self.extent.min.y],
            [self.extent.max.x, self.extent.max.y],
        )
    }
}

impl PointDistance for ExtentEntry {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        Envelope::distance_2(&self.envelope(), point)
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        Envelope::contains_point(&self.envelope(), point)
    }
}

/// Spatial index over rendered extents, for hit-testing and viewport culling.
pub struct ExtentIndex {
    tree: RTree<ExtentEntry>,
}

impl ExtentIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn build(entries: Vec<ExtentEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn insert(&mut self, geometry: GeometryId, extent: PointExtent) {
        self.tree.insert(ExtentEntry { geometry, extent });
    }

    /// All entries whose extent contains the given device point.
    pub fn query_point(&self, point: &Point) -> Vec<&ExtentEntry> {
        self.tree.locate_all_at_point(&[point.x, point.y]).collect()
    }

    /// All entries intersecting the given device-space viewport.
    pub fn query_viewport(&self, viewport: &PointExtent) -> Vec<&ExtentEntry> {
        let envelope = AABB::from_corners(
            [viewport.min.x, viewport.min.y],
            [viewport.max.x, viewport.max.y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for ExtentIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtentIndex")
            .field("len", &self.len())
            .finish()
    }
}
