//! Arrow glyphs along polylines.
//!
//! A glyph is a triangle with its tip at the local origin and its base
//! `height` units behind it, mapped onto the path by
//! `translate(current) * rotate(atan2(dx, -dy))`. Angle 0 points up the
//! screen.

use std::collections::BTreeMap;

use mapcanvas_core::{ArrowPlacement, Matrix, Point};
use serde::{Deserialize, Serialize};

use crate::surface::RenderSurface;

/// Glyph proportions, as multiples of the path's stroke width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowStyle {
    pub width_factor: f64,
    pub height_factor: f64,
}

/// Named arrow styles plus the minimum stroke width glyphs are scaled from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArrowTable {
    pub arrow_styles: BTreeMap<String, ArrowStyle>,
    pub min_arrow_line_width: f64,
}

impl Default for ArrowTable {
    fn default() -> Self {
        let mut arrow_styles = BTreeMap::new();
        arrow_styles.insert(
            "classic".to_string(),
            ArrowStyle {
                width_factor: 2.0,
                height_factor: 5.0,
            },
        );
        Self {
            arrow_styles,
            min_arrow_line_width: 3.0,
        }
    }
}

impl ArrowTable {
    pub fn get(&self, name: &str) -> Option<&ArrowStyle> {
        self.arrow_styles.get(name)
    }
}

/// Arrow configuration carried by a polyline draw call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathDecoration {
    pub style: String,
    pub placement: ArrowPlacement,
    pub line_width: f64,
}

/// The closed 4-point ring (tip, left, right, tip) of an arrow at `current`,
/// pointing away from `prev`.
pub fn arrow_glyph(
    prev: &Point,
    current: &Point,
    line_width: f64,
    style: &ArrowStyle,
    min_line_width: f64,
) -> [Point; 4] {
    let line_width = if line_width.is_finite() && line_width >= min_line_width {
        line_width
    } else {
        min_line_width
    };
    let hh = line_width * style.height_factor;
    let hw = line_width * style.width_factor / 2.0;

    let tip = Point::new(0.0, 0.0);
    let template = [tip, Point::new(-hw, hh), Point::new(hw, hh), tip];

    let angle = (current.x - prev.x).atan2(prev.y - current.y);
    let matrix = Matrix::identity()
        .translate(current.x, current.y)
        .rotate(angle);
    template.map(|p| matrix.apply(&p))
}

/// Draws one arrow; unknown style names draw nothing. Returns whether a glyph was drawn.
pub fn draw_arrow(
    surface: &mut dyn RenderSurface,
    prev: &Point,
    current: &Point,
    opacity: f64,
    decoration: &PathDecoration,
    table: &ArrowTable,
) -> bool {
    let Some(style) = table.get(&decoration.style) else {
        return false;
    };
    let glyph = arrow_glyph(
        prev,
        current,
        decoration.line_width,
        style,
        table.min_arrow_line_width,
    );
    surface.polygon(&[glyph.to_vec()], opacity, opacity);
    true
}

/// Overlays arrows on an already-stroked path according to its placement.
///
/// `parts` are the device-space parts of the path (two if it was split at
/// the antimeridian); `vertex-first` uses the first part, `vertex-last` the
/// last one. Returns the number of glyphs drawn.
pub fn decorate(
    surface: &mut dyn RenderSurface,
    parts: &[&[Point]],
    decoration: &PathDecoration,
    opacity: f64,
    table: &ArrowTable,
) -> usize {
    let total: usize = parts.iter().map(|p| p.len()).sum();
    if total < 2 {
        return 0;
    }

    let mut drawn = 0;
    let mut arrow = |surface: &mut dyn RenderSurface, prev: &Point, current: &Point| {
        if draw_arrow(&mut *surface, prev, current, opacity, decoration, table) {
            drawn += 1;
        }
    };

    let placement = decoration.placement;
    if matches!(
        placement,
        ArrowPlacement::VertexFirst | ArrowPlacement::VertexFirstLast
    ) {
        if let Some(first) = parts.first().filter(|p| p.len() >= 2) {
            arrow(&mut *surface, &first[1], &first[0]);
        }
    }
    if matches!(
        placement,
        ArrowPlacement::VertexLast | ArrowPlacement::VertexFirstLast
    ) {
        if let Some(last) = parts.last().filter(|p| p.len() >= 2) {
            let n = last.len();
            arrow(&mut *surface, &last[n - 2], &last[n - 1]);
        }
    }
    if placement == ArrowPlacement::Point {
        for part in parts {
            for w in part.windows(2) {
                arrow(&mut *surface, &w[0], &w[1]);
            }
        }
    }
    drawn
}
