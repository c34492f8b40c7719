
use serde::{Deserialize, Serialize};

/// A coordinate in projected map space (y grows northwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point in device pixels (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn add(&self, other: &Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

/// Width and height, in whatever unit the caller works in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned box in device (or device-relative) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointExtent {
    pub min: Point,
    pub max: Point,
}

impl PointExtent {
    /// Builds an extent from two opposite corners in any order.
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    pub fn from_points(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let mut extent = Self::new(*first, *first);
        for p in &points[1..] {
            extent.min.x = extent.min.x.min(p.x);
            extent.min.y = extent.min.y.min(p.y);
            extent.max.x = extent.max.x.max(p.x);
            extent.max.y = extent.max.y.max(p.y);
        }
        Some(extent)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min.x + self.max.x) / 2.0,
            (self.min.y + self.max.y) / 2.0,
        )
    }

    pub fn contains_point(&self, p: &Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn union(&self, other: &PointExtent) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    pub fn translate(&self, offset: &Point) -> Self {
        Self {
            min: self.min.add(offset),
            max: self.max.add(offset),
        }
    }
}

/// Which path vertices receive an arrow glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ArrowPlacement {
    VertexFirst,
    #[default]
    VertexLast,
    #[serde(rename = "vertex-firstlast")]
    VertexFirstLast,
    Point,
}

/// A polyline in projected space, with optional arrow decoration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineString {
    pub vertices: Vec<Coordinate>,
    /// Name of an entry in the arrow style table; `None` disables arrows.
    pub arrow_style: Option<String>,
    pub arrow_placement: ArrowPlacement,
}

impl LineString {
    pub fn new(vertices: Vec<Coordinate>) -> Self {
        Self {
            vertices,
            arrow_style: None,
            arrow_placement: ArrowPlacement::default(),
        }
    }

    pub fn with_arrows(mut self, style: &str, placement: ArrowPlacement) -> Self {
        self.arrow_style = Some(style.to_string());
        self.arrow_placement = placement;
        self
    }
}

/// A polygon shell with zero or more holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub shell: Vec<Coordinate>,
    pub holes: Vec<Vec<Coordinate>>,
}

impl Polygon {
    pub fn new(shell: Vec<Coordinate>) -> Self {
        Self {
            shell,
            holes: Vec::new(),
        }
    }

    pub fn with_hole(mut self, hole: Vec<Coordinate>) -> Self {
        self.holes.push(hole);
        self
    }
}

/// Type tag of a [`Shape`], used to pick a shape resource provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    Marker,
    LineString,
    Polygon,
    Circle,
    Ellipse,
    Sector,
    Rectangle,
}

/// The drawable shape of a geometry. Sizes and radii are in projected units,
/// angles in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Marker(Coordinate),
    LineString(LineString),
    Polygon(Polygon),
    Circle {
        center: Coordinate,
        radius: f64,
    },
    Ellipse {
        center: Coordinate,
        width: f64,
        height: f64,
    },
    Sector {
        center: Coordinate,
        radius: f64,
        start_angle: f64,
        end_angle: f64,
    },
    /// `corner` is the north-west corner.
    Rectangle {
        corner: Coordinate,
        width: f64,
        height: f64,
    },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Marker(_) => ShapeKind::Marker,
            Shape::LineString(_) => ShapeKind::LineString,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Ellipse { .. } => ShapeKind::Ellipse,
            Shape::Sector { .. } => ShapeKind::Sector,
            Shape::Rectangle { .. } => ShapeKind::Rectangle,
        }
    }

    /// The anchor coordinate: the marker position, shape center, rectangle
    /// corner, or the mean of a path's vertices.
    pub fn prj_center(&self) -> Option<Coordinate> {
        match self {
            Shape::Marker(c) => Some(*c),
            Shape::Circle { center, .. }
            | Shape::Ellipse { center, .. }
            | Shape::Sector { center, .. } => Some(*center),
            Shape::Rectangle { corner, .. } => Some(*corner),
            Shape::LineString(line) => mean(&line.vertices),
            Shape::Polygon(polygon) => mean(&polygon.shell),
        }
    }

    pub fn prj_vertices(&self) -> &[Coordinate] {
        match self {
            Shape::LineString(line) => &line.vertices,
            Shape::Polygon(polygon) => &polygon.shell,
            Shape::Marker(c) => std::slice::from_ref(c),
            _ => &[],
        }
    }

    pub fn prj_holes(&self) -> &[Vec<Coordinate>] {
        match self {
            Shape::Polygon(polygon) => &polygon.holes,
            _ => &[],
        }
    }

    /// Render size in projected units: radii for round shapes, the full
    /// size for rectangles.
    pub fn projected_size(&self) -> Option<Size> {
        match self {
            Shape::Circle { radius, .. } | Shape::Sector { radius, .. } => {
                Some(Size::new(*radius, *radius))
            }
            Shape::Ellipse { width, height, .. } => Some(Size::new(width / 2.0, height / 2.0)),
            Shape::Rectangle { width, height, .. } => Some(Size::new(*width, *height)),
            _ => None,
        }
    }

    pub fn start_angle(&self) -> Option<f64> {
        match self {
            Shape::Sector { start_angle, .. } => Some(*start_angle),
            _ => None,
        }
    }

    pub fn end_angle(&self) -> Option<f64> {
        match self {
            Shape::Sector { end_angle, .. } => Some(*end_angle),
            _ => None,
        }
    }
}

fn mean(coords: &[Coordinate]) -> Option<Coordinate> {
    if coords.is_empty() {
        return None;
    }
    let n = coords.len() as f64;
    let (sx, sy) = coords
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    Some(Coordinate::new(sx / n, sy / n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_distance() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
    }

    #[test]
    fn test_extent_normalizes_corners() {
        let e = PointExtent::new(Point::new(10.0, -5.0), Point::new(-10.0, 5.0));
        assert_eq!(e.min, Point::new(-10.0, -5.0));
        assert_eq!(e.max, Point::new(10.0, 5.0));
        assert!((e.width() - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_polygon_accessors() {
        let shape = Shape::Polygon(
            Polygon::new(vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(4.0, 0.0),
                Coordinate::new(4.0, 4.0),
                Coordinate::new(0.0, 4.0),
            ])
            .with_hole(vec![Coordinate::new(1.0, 1.0), Coordinate::new(2.0, 1.0)]),
        );
        assert_eq!(shape.kind(), ShapeKind::Polygon);
        assert_eq!(shape.prj_vertices().len(), 4);
        assert_eq!(shape.prj_holes().len(), 1);
        assert_eq!(shape.prj_center(), Some(Coordinate::new(2.0, 2.0)));
    }

    #[test]
    fn test_sector_angles() {
        let shape = Shape::Sector {
            center: Coordinate::new(0.0, 0.0),
            radius: 10.0,
            start_angle: 30.0,
            end_angle: 120.0,
        };
        assert_eq!(shape.start_angle(), Some(30.0));
        assert_eq!(shape.end_angle(), Some(120.0));
        assert_eq!(shape.projected_size(), Some(Size::new(10.0, 10.0)));
    }
}
