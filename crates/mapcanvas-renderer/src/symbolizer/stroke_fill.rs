use mapcanvas_core::{Geometry, Symbol};

use super::{RenderContext, Symbolizer, SymbolizerKind};
use crate::draw::PaintStyle;
use crate::options::RenderOptions;
use crate::surface::RenderSurface;

/// Strokes and fills a shape through its resource provider.
#[derive(Debug, Clone)]
pub struct StrokeAndFillSymbolizer {
    symbol: Symbol,
    paint: PaintStyle,
}

impl StrokeAndFillSymbolizer {
    pub fn new(symbol: &Symbol) -> Self {
        Self {
            symbol: symbol.clone(),
            paint: PaintStyle::from_symbol(symbol),
        }
    }

    pub fn paint(&self) -> &PaintStyle {
        &self.paint
    }
}

impl Symbolizer for StrokeAndFillSymbolizer {
    fn name(&self) -> &'static str {
        "stroke-and-fill"
    }

    fn symbolize(
        &mut self,
        geometry: &Geometry,
        surface: &mut dyn RenderSurface,
        ctx: &mut RenderContext,
    ) -> bool {
        let Some(call) = ctx
            .providers
            .resources(geometry, &ctx.projector, &self.symbol)
        else {
            return false;
        };
        call.draw(surface, &self.paint, &ctx.options.arrows);
        if let Some(extent) = call.extent() {
            ctx.record_extent(geometry.id, extent);
        }
        true
    }
}

/// Matches descriptors that carry no marker or text keys.
#[derive(Debug, Clone, Copy)]
pub struct StrokeAndFillKind;

impl SymbolizerKind for StrokeAndFillKind {
    fn name(&self) -> &'static str {
        "stroke-and-fill"
    }

    fn test(&self, symbol: Option<&Symbol>) -> bool {
        symbol.is_some_and(|s| ["markerFile", "markerType", "textName"].iter().all(|k| s.is_nil(k)))
    }

    fn build(&self, symbol: &Symbol, _: &Geometry, _: &RenderOptions) -> Box<dyn Symbolizer> {
        Box::new(StrokeAndFillSymbolizer::new(symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_data::{RecordingSurface, SurfaceCommand};
    use crate::symbolizer::tests::Harness;
    use mapcanvas_core::{ArrowPlacement, Coordinate, LineString, Point, Polygon, Shape};

    #[test]
    fn test_polygon_uses_paint_style() {
        let geometry = Geometry::new(Shape::Polygon(Polygon::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(10.0, 0.0),
            Coordinate::new(10.0, 10.0),
        ])));
        let symbol = Symbol::new()
            .with("lineOpacity", 0.25)
            .with("polygonOpacity", 0.75);
        let mut h = Harness::new();
        let mut surface = RecordingSurface::new();
        let mut sym = StrokeAndFillSymbolizer::new(&symbol);
        assert!(sym.symbolize(&geometry, &mut surface, &mut h.ctx()));

        match &surface.commands()[0] {
            SurfaceCommand::Polygon {
                line_opacity,
                fill_opacity,
                ..
            } => {
                assert_eq!(*line_opacity, 0.25);
                assert_eq!(*fill_opacity, 0.75);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(h.extents.len(), 1);
    }

    #[test]
    fn test_dashed_line_with_arrows() {
        let line = LineString::new(vec![Coordinate::new(0.0, 0.0), Coordinate::new(0.0, 10.0)])
            .with_arrows("classic", ArrowPlacement::VertexLast);
        let geometry = Geometry::new(Shape::LineString(line));
        let symbol = Symbol::new().with("lineDasharray", "4,2");
        let mut h = Harness::new();
        let mut surface = RecordingSurface::new();
        StrokeAndFillSymbolizer::new(&symbol).symbolize(&geometry, &mut surface, &mut h.ctx());

        let ops: Vec<_> = surface.commands().iter().map(SurfaceCommand::op).collect();
        assert_eq!(ops, vec!["path", "polygon"]);
        match &surface.commands()[0] {
            SurfaceCommand::Path { dash, .. } => assert_eq!(dash.as_deref(), Some(&[4.0, 2.0][..])),
            other => panic!("unexpected {:?}", other),
        }
        // Arrow tip on the last vertex, device (180, 80).
        match &surface.commands()[1] {
            SurfaceCommand::Polygon { rings, .. } => {
                assert!((rings[0][0].x - 180.0).abs() < 1e-10);
                assert!((rings[0][0].y - 80.0).abs() < 1e-10);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_marker_shape_has_nothing_to_draw() {
        let geometry = Geometry::new(Shape::Marker(Coordinate::new(0.0, 0.0)));
        let mut h = Harness::new();
        let mut surface = RecordingSurface::new();
        assert!(!StrokeAndFillSymbolizer::new(&Symbol::new()).symbolize(
            &geometry,
            &mut surface,
            &mut h.ctx()
        ));
        assert!(surface.commands().is_empty());
        assert!(h.extents.query_point(&Point::new(180.0, 90.0)).is_empty());
    }

    #[test]
    fn test_predicate() {
        assert!(StrokeAndFillKind.test(Some(&Symbol::new())));
        assert!(StrokeAndFillKind.test(Some(&Symbol::from_json(r#"{"markerFile": null}"#).unwrap())));
        assert!(!StrokeAndFillKind.test(Some(&Symbol::new().with("textName", "x"))));
        assert!(!StrokeAndFillKind.test(None));
    }
}
