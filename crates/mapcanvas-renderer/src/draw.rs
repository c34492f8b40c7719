use mapcanvas_core::{Point, PointExtent, Size, Symbol};
use serde::{Deserialize, Serialize};

use crate::decoration::{decorate, ArrowTable, PathDecoration};
use crate::projector::DevicePath;
use crate::surface::RenderSurface;

/// The primitive a draw call maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DrawOp {
    Ellipse,
    Rectangle,
    Sector,
    Path,
    Polygon,
}

/// A primitive plus its device-space arguments. Rebuilt every pass.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// `width`/`height` are semi-axes.
    Ellipse {
        center: Point,
        width: f64,
        height: f64,
    },
    Rectangle {
        top_left: Point,
        size: Size,
    },
    Sector {
        center: Point,
        radius: f64,
        angles: [f64; 2],
    },
    /// Stroked, then decorated with arrows if configured.
    Path {
        points: DevicePath,
        decoration: Option<PathDecoration>,
    },
    /// One entry per antimeridian part; each part is `[shell, holes...]`.
    Polygon { parts: Vec<Vec<Vec<Point>>> },
}

impl DrawCall {
    pub fn op(&self) -> DrawOp {
        match self {
            DrawCall::Ellipse { .. } => DrawOp::Ellipse,
            DrawCall::Rectangle { .. } => DrawOp::Rectangle,
            DrawCall::Sector { .. } => DrawOp::Sector,
            DrawCall::Path { .. } => DrawOp::Path,
            DrawCall::Polygon { .. } => DrawOp::Polygon,
        }
    }

    /// Device-space bounds of what this call draws, ignoring stroke width.
    pub fn extent(&self) -> Option<PointExtent> {
        match self {
            DrawCall::Ellipse {
                center,
                width,
                height,
            } => Some(PointExtent::new(
                center.translate(-width, -height),
                center.translate(*width, *height),
            )),
            DrawCall::Rectangle { top_left, size } => Some(PointExtent::new(
                *top_left,
                top_left.translate(size.width, size.height),
            )),
            DrawCall::Sector { center, radius, .. } => Some(PointExtent::new(
                center.translate(-radius, -radius),
                center.translate(*radius, *radius),
            )),
            DrawCall::Path { points, .. } => points.extent(),
            DrawCall::Polygon { parts } => {
                let shells: Vec<Point> = parts
                    .iter()
                    .filter_map(|rings| rings.first())
                    .flatten()
                    .copied()
                    .collect();
                PointExtent::from_points(&shells)
            }
        }
    }

    pub fn draw(&self, surface: &mut dyn RenderSurface, paint: &PaintStyle, arrows: &ArrowTable) {
        match self {
            DrawCall::Ellipse {
                center,
                width,
                height,
            } => surface.ellipse(*center, *width, *height),
            DrawCall::Rectangle { top_left, size } => surface.rectangle(*top_left, *size),
            DrawCall::Sector {
                center,
                radius,
                angles,
            } => surface.sector(*center, *radius, *angles),
            DrawCall::Path { points, decoration } => {
                let parts = points.parts();
                for part in &parts {
                    surface.path(part, paint.line_opacity, None, paint.dash.as_deref());
                }
                if let Some(decoration) = decoration {
                    decorate(surface, &parts, decoration, paint.line_opacity, arrows);
                }
            }
            DrawCall::Polygon { parts } => {
                for rings in parts {
                    surface.polygon(rings, paint.line_opacity, paint.fill_opacity);
                }
            }
        }
    }
}

/// Stroke and fill settings read from a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaintStyle {
    pub line_width: f64,
    pub line_opacity: f64,
    pub fill_opacity: f64,
    pub dash: Option<Vec<f64>>,
}

impl Default for PaintStyle {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            line_opacity: 1.0,
            fill_opacity: 1.0,
            dash: None,
        }
    }
}

impl PaintStyle {
    /// Reads `lineWidth`, `lineOpacity`, `polygonOpacity` and `lineDasharray`;
    /// absent or invalid values keep their defaults.
    pub fn from_symbol(symbol: &Symbol) -> Self {
        let defaults = Self::default();
        Self {
            line_width: symbol.number("lineWidth").unwrap_or(defaults.line_width),
            line_opacity: symbol
                .number("lineOpacity")
                .unwrap_or(defaults.line_opacity),
            fill_opacity: symbol
                .number("polygonOpacity")
                .unwrap_or(defaults.fill_opacity),
            dash: symbol.string("lineDasharray").and_then(parse_dash),
        }
    }
}

fn parse_dash(s: &str) -> Option<Vec<f64>> {
    let dash: Vec<f64> = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite() && *v >= 0.0)
        .collect();
    (!dash.is_empty()).then_some(dash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_data::{RecordingSurface, SurfaceCommand};
    use mapcanvas_core::ArrowPlacement;

    #[test]
    fn test_paint_style_defaults() {
        assert_eq!(PaintStyle::from_symbol(&Symbol::new()), PaintStyle::default());
    }

    #[test]
    fn test_paint_style_reads_symbol() {
        let symbol = Symbol::new()
            .with("lineWidth", 4.0)
            .with("lineOpacity", 0.5)
            .with("polygonOpacity", "bogus")
            .with("lineDasharray", "5, 2,x");
        let paint = PaintStyle::from_symbol(&symbol);
        assert_eq!(paint.line_width, 4.0);
        assert_eq!(paint.line_opacity, 0.5);
        assert_eq!(paint.fill_opacity, 1.0);
        assert_eq!(paint.dash, Some(vec![5.0, 2.0]));
    }

    #[test]
    fn test_split_path_strokes_each_part_then_decorates() {
        let call = DrawCall::Path {
            points: DevicePath::Split([
                vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0)],
                vec![Point::new(20.0, 0.0), Point::new(30.0, 0.0)],
            ]),
            decoration: Some(PathDecoration {
                style: "classic".into(),
                placement: ArrowPlacement::Point,
                line_width: 1.0,
            }),
        };
        let mut surface = RecordingSurface::new();
        call.draw(&mut surface, &PaintStyle::default(), &ArrowTable::default());
        let ops: Vec<_> = surface.commands().iter().map(SurfaceCommand::op).collect();
        assert_eq!(ops, vec!["path", "path", "polygon", "polygon"]);
    }

    #[test]
    fn test_polygon_draws_once_per_part() {
        let ring = vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(1.0, 1.0)];
        let call = DrawCall::Polygon {
            parts: vec![vec![ring.clone()], vec![ring.clone(), ring]],
        };
        let mut surface = RecordingSurface::new();
        call.draw(&mut surface, &PaintStyle::default(), &ArrowTable::default());
        assert_eq!(surface.count("polygon"), 2);
        assert_eq!(call.op(), DrawOp::Polygon);
    }

    #[test]
    fn test_ellipse_extent_uses_semi_axes() {
        let call = DrawCall::Ellipse {
            center: Point::new(10.0, 10.0),
            width: 4.0,
            height: 2.0,
        };
        let e = call.extent().unwrap();
        assert_eq!(e.min, Point::new(6.0, 8.0));
        assert_eq!(e.max, Point::new(14.0, 12.0));
    }
}
