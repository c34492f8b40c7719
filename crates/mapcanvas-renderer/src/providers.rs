//! Shape resource providers: geometry + projection → draw call.

use std::collections::HashMap;

use mapcanvas_core::{Geometry, Point, PointExtent, Shape, ShapeKind, Symbol};

use crate::decoration::PathDecoration;
use crate::draw::{DrawCall, PaintStyle};
use crate::projector::{DevicePath, Projector, RingKind};

/// Builds the draw call for one kind of shape. Implementations are pure.
pub trait ShapeResources {
    fn resources(&self, geometry: &Geometry, projector: &Projector, symbol: &Symbol)
        -> Option<DrawCall>;
}

/// Circles and ellipses.
pub struct EllipseResources;

impl ShapeResources for EllipseResources {
    fn resources(&self, geometry: &Geometry, projector: &Projector, _: &Symbol) -> Option<DrawCall> {
        let center = projector.point(&geometry.shape.prj_center()?);
        let size = projector.size(geometry.shape.projected_size()?);
        Some(DrawCall::Ellipse {
            center,
            width: size.width,
            height: size.height,
        })
    }
}

pub struct RectangleResources;

impl ShapeResources for RectangleResources {
    fn resources(&self, geometry: &Geometry, projector: &Projector, _: &Symbol) -> Option<DrawCall> {
        let top_left = projector.point(&geometry.shape.prj_center()?);
        let size = projector.size(geometry.shape.projected_size()?);
        Some(DrawCall::Rectangle { top_left, size })
    }
}

pub struct SectorResources;

impl ShapeResources for SectorResources {
    fn resources(&self, geometry: &Geometry, projector: &Projector, _: &Symbol) -> Option<DrawCall> {
        let shape = &geometry.shape;
        let center = projector.point(&shape.prj_center()?);
        let radius = projector.size(shape.projected_size()?).width;
        Some(DrawCall::Sector {
            center,
            radius,
            angles: [shape.start_angle()?, shape.end_angle()?],
        })
    }
}

/// Open paths, decorated with arrows when the line carries an arrow style.
pub struct LineStringResources;

impl ShapeResources for LineStringResources {
    fn resources(
        &self,
        geometry: &Geometry,
        projector: &Projector,
        symbol: &Symbol,
    ) -> Option<DrawCall> {
        let Shape::LineString(line) = &geometry.shape else {
            return None;
        };
        let points = projector.project_ring(&line.vertices, RingKind::Open);
        if points.is_empty() {
            return None;
        }
        let decoration = line.arrow_style.as_ref().map(|style| PathDecoration {
            style: style.clone(),
            placement: line.arrow_placement,
            line_width: PaintStyle::from_symbol(symbol).line_width,
        });
        Some(DrawCall::Path { points, decoration })
    }
}

/// Polygons with holes. When the shell splits at the antimeridian, each hole
/// part goes to the body part whose extent holds its first point.
pub struct PolygonResources;

impl ShapeResources for PolygonResources {
    fn resources(&self, geometry: &Geometry, projector: &Projector, _: &Symbol) -> Option<DrawCall> {
        let shape = &geometry.shape;
        let body = projector.project_ring(shape.prj_vertices(), RingKind::Closed);
        if body.is_empty() {
            return None;
        }
        let holes: Vec<Vec<Point>> = shape
            .prj_holes()
            .iter()
            .flat_map(|hole| projector.project_ring(hole, RingKind::Closed).into_parts())
            .filter(|part| !part.is_empty())
            .collect();

        let parts = match body {
            DevicePath::Single(shell) => {
                let mut rings = vec![shell];
                rings.extend(holes);
                vec![rings]
            }
            DevicePath::Split(shells) => assign_holes(shells, holes),
        };
        Some(DrawCall::Polygon { parts })
    }
}

fn assign_holes(shells: [Vec<Point>; 2], holes: Vec<Vec<Point>>) -> Vec<Vec<Vec<Point>>> {
    let extents = [
        PointExtent::from_points(&shells[0]),
        PointExtent::from_points(&shells[1]),
    ];
    let mut parts: Vec<Vec<Vec<Point>>> = shells.into_iter().map(|s| vec![s]).collect();
    for hole in holes {
        let first = hole[0];
        let containing = extents
            .iter()
            .position(|e| e.is_some_and(|e| e.contains_point(&first)));
        let target = containing.unwrap_or_else(|| nearest(&extents, &first));
        parts[target].push(hole);
    }
    parts
}

fn nearest(extents: &[Option<PointExtent>; 2], p: &Point) -> usize {
    let d = |e: &Option<PointExtent>| e.map_or(f64::INFINITY, |e| e.center().distance_to(p));
    if d(&extents[1]) < d(&extents[0]) {
        1
    } else {
        0
    }
}

/// Providers by shape kind.
pub struct ProviderTable {
    providers: HashMap<ShapeKind, Box<dyn ShapeResources>>,
}

impl ProviderTable {
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
        }
    }

    /// Replaces any provider already registered for `kind`.
    pub fn register(&mut self, kind: ShapeKind, provider: Box<dyn ShapeResources>) {
        self.providers.insert(kind, provider);
    }

    pub fn get(&self, kind: ShapeKind) -> Option<&dyn ShapeResources> {
        self.providers.get(&kind).map(|p| p.as_ref())
    }

    /// `None` if no provider handles the shape or the shape has nothing to draw.
    pub fn resources(
        &self,
        geometry: &Geometry,
        projector: &Projector,
        symbol: &Symbol,
    ) -> Option<DrawCall> {
        self.get(geometry.shape.kind())?
            .resources(geometry, projector, symbol)
    }
}

impl Default for ProviderTable {
    fn default() -> Self {
        let mut table = Self::empty();
        table.register(ShapeKind::Circle, Box::new(EllipseResources));
        table.register(ShapeKind::Ellipse, Box::new(EllipseResources));
        table.register(ShapeKind::Rectangle, Box::new(RectangleResources));
        table.register(ShapeKind::Sector, Box::new(SectorResources));
        table.register(ShapeKind::LineString, Box::new(LineStringResources));
        table.register(ShapeKind::Polygon, Box::new(PolygonResources));
        table
    }
}

impl std::fmt::Debug for ProviderTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.providers.keys().map(|k| format!("{:?}", k)).collect();
        kinds.sort();
        f.debug_struct("ProviderTable").field("kinds", &kinds).finish()
    }
}
