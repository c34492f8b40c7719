//! # MapCanvas Core
//!
//! Geometry primitives in projected and device space, map shapes and the
//! scene that owns them, style descriptors, affine transforms, and an
//! R-tree over rendered extents for hit-testing and culling.
//!
//! Everything here is renderer-agnostic; `mapcanvas-renderer` turns these
//! types into draw calls.

pub mod geometry;
pub mod scene;
pub mod spatial;
pub mod style;
pub mod transform;

pub use geometry::{
    ArrowPlacement, Coordinate, LineString, Point, PointExtent, Polygon, Shape, ShapeKind, Size,
};
pub use scene::{Geometry, GeometryId, Scene};
pub use spatial::ExtentIndex;
pub use style::{StyleDescriptor, StyleError, StyleValue, Symbol};
pub use transform::Matrix;
