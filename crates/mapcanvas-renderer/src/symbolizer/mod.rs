//! Symbolizers: drawing strategies selected per style descriptor.
//!
//! A [`SymbolizerKind`] decides from a symbol alone whether it can draw it;
//! the [`SymbolizerRegistry`] asks each kind in registration order and
//! builds the first match. Predicates never fail: a malformed or missing
//! symbol simply does not match.

mod image_marker;
mod stroke_fill;

use std::fmt;

use mapcanvas_core::{ExtentIndex, Geometry, GeometryId, PointExtent, Symbol};

use crate::options::RenderOptions;
use crate::projector::Projector;
use crate::providers::ProviderTable;
use crate::resources::{ResourceCache, ResourceKey};
use crate::surface::RenderSurface;

pub use image_marker::{
    ImageMarkerKind, ImageMarkerSymbolizer, MarkerPlacement, MarkerState, MarkerVariant,
    VectorPathMarkerKind,
};
pub use stroke_fill::{StrokeAndFillKind, StrokeAndFillSymbolizer};

/// Everything a symbolizer may read or touch during one render pass.
pub struct RenderContext<'a> {
    pub projector: Projector<'a>,
    pub providers: &'a ProviderTable,
    pub resources: &'a mut ResourceCache,
    pub options: &'a RenderOptions,
    invalidations: &'a mut Vec<GeometryId>,
    extents: &'a mut ExtentIndex,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        projector: Projector<'a>,
        providers: &'a ProviderTable,
        resources: &'a mut ResourceCache,
        options: &'a RenderOptions,
        invalidations: &'a mut Vec<GeometryId>,
        extents: &'a mut ExtentIndex,
    ) -> Self {
        Self {
            projector,
            providers,
            resources,
            options,
            invalidations,
            extents,
        }
    }

    /// Marks the geometry's cached render output as stale.
    pub fn invalidate(&mut self, geometry: GeometryId) {
        if !self.invalidations.contains(&geometry) {
            self.invalidations.push(geometry);
        }
    }

    /// Records a device-space extent for hit-testing.
    pub fn record_extent(&mut self, geometry: GeometryId, extent: PointExtent) {
        self.extents.insert(geometry, extent);
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("projector", &self.projector)
            .field("invalidations", &self.invalidations.len())
            .finish()
    }
}

pub trait Symbolizer: fmt::Debug {
    fn name(&self) -> &'static str;

    /// Draws `geometry`. Returns `false` when a skip condition applied and
    /// nothing was drawn.
    fn symbolize(
        &mut self,
        geometry: &Geometry,
        surface: &mut dyn RenderSurface,
        ctx: &mut RenderContext,
    ) -> bool;

    /// External resources this symbolizer needs loaded before it can draw.
    fn resource_keys(&self) -> Vec<ResourceKey> {
        Vec::new()
    }
}

/// A symbolizer type: its predicate and its constructor.
pub trait SymbolizerKind {
    fn name(&self) -> &'static str;

    /// Whether this kind can draw `symbol`. Total; never panics.
    fn test(&self, symbol: Option<&Symbol>) -> bool;

    fn build(
        &self,
        symbol: &Symbol,
        geometry: &Geometry,
        options: &RenderOptions,
    ) -> Box<dyn Symbolizer>;
}

/// Ordered list of symbolizer kinds; the first whose predicate accepts wins.
pub struct SymbolizerRegistry {
    kinds: Vec<Box<dyn SymbolizerKind>>,
}

impl SymbolizerRegistry {
    pub fn new() -> Self {
        Self { kinds: Vec::new() }
    }

    /// Appends `kind` after every kind already registered.
    pub fn register(&mut self, kind: Box<dyn SymbolizerKind>) {
        self.kinds.push(kind);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.kinds.iter().map(|k| k.name()).collect()
    }

    pub fn dispatch(
        &self,
        symbol: Option<&Symbol>,
        geometry: &Geometry,
        options: &RenderOptions,
    ) -> Option<Box<dyn Symbolizer>> {
        let Some(kind) = self.kinds.iter().find(|k| k.test(symbol)) else {
            log::debug!("No symbolizer for geometry {}", geometry.id);
            return None;
        };
        let empty = Symbol::new();
        Some(kind.build(symbol.unwrap_or(&empty), geometry, options))
    }
}

impl Default for SymbolizerRegistry {
    fn default() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(VectorPathMarkerKind));
        registry.register(Box::new(ImageMarkerKind));
        registry.register(Box::new(StrokeAndFillKind));
        registry
    }
}

impl fmt::Debug for SymbolizerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymbolizerRegistry")
            .field("kinds", &self.names())
            .finish()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::projector::tests::PlateCarree;
    use mapcanvas_core::{Coordinate, Shape};

    /// Owns everything a [`RenderContext`] borrows.
    pub(crate) struct Harness {
        pub projection: PlateCarree,
        pub providers: ProviderTable,
        pub cache: ResourceCache,
        pub options: RenderOptions,
        pub invalidations: Vec<GeometryId>,
        pub extents: ExtentIndex,
    }

    impl Harness {
        pub fn new() -> Self {
            Self {
                projection: PlateCarree { wrap: true },
                providers: ProviderTable::default(),
                cache: ResourceCache::new(),
                options: RenderOptions::default(),
                invalidations: Vec::new(),
                extents: ExtentIndex::new(),
            }
        }

        pub fn ctx(&mut self) -> RenderContext<'_> {
            let Harness {
                projection,
                providers,
                cache,
                options,
                invalidations,
                extents,
            } = self;
            RenderContext::new(
                Projector::new(&*projection, options.antimeridian),
                &*providers,
                cache,
                &*options,
                invalidations,
                extents,
            )
        }
    }

    #[derive(Debug)]
    struct Named(&'static str);

    impl Symbolizer for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn symbolize(&mut self, _: &Geometry, _: &mut dyn RenderSurface, _: &mut RenderContext) -> bool {
            false
        }
    }

    struct HasKey(&'static str, &'static str);

    impl SymbolizerKind for HasKey {
        fn name(&self) -> &'static str {
            self.0
        }

        fn test(&self, symbol: Option<&Symbol>) -> bool {
            symbol.is_some_and(|s| !s.is_nil(self.1))
        }

        fn build(&self, _: &Symbol, _: &Geometry, _: &RenderOptions) -> Box<dyn Symbolizer> {
            Box::new(Named(self.0))
        }
    }

    fn marker() -> Geometry {
        Geometry::new(Shape::Marker(Coordinate::new(0.0, 0.0)))
    }

    #[test]
    fn test_first_matching_kind_wins() {
        let mut registry = SymbolizerRegistry::new();
        registry.register(Box::new(HasKey("first", "a")));
        registry.register(Box::new(HasKey("second", "a")));
        registry.register(Box::new(HasKey("third", "b")));

        let options = RenderOptions::default();
        let symbol = Symbol::new().with("a", 1.0).with("b", 1.0);
        let built = registry.dispatch(Some(&symbol), &marker(), &options).unwrap();
        assert_eq!(built.name(), "first");

        let symbol = Symbol::new().with("b", 1.0);
        let built = registry.dispatch(Some(&symbol), &marker(), &options).unwrap();
        assert_eq!(built.name(), "third");
    }

    #[test]
    fn test_no_match_is_silent() {
        let mut registry = SymbolizerRegistry::new();
        registry.register(Box::new(HasKey("only", "a")));
        let options = RenderOptions::default();
        assert!(registry.dispatch(None, &marker(), &options).is_none());
        assert!(registry
            .dispatch(Some(&Symbol::new()), &marker(), &options)
            .is_none());
    }

    #[test]
    fn test_default_order() {
        assert_eq!(
            SymbolizerRegistry::default().names(),
            vec!["vector-path-marker", "image-marker", "stroke-and-fill"]
        );
    }

    #[test]
    fn test_default_dispatch_by_symbol_shape() {
        let registry = SymbolizerRegistry::default();
        let options = RenderOptions::default();
        let cases = [
            (Symbol::new().with("markerFile", "pin.png"), Some("image-marker")),
            (
                Symbol::new()
                    .with("markerType", "path")
                    .with("markerPath", "M0 0 L10 10"),
                Some("vector-path-marker"),
            ),
            (Symbol::new().with("lineWidth", 2.0), Some("stroke-and-fill")),
            (Symbol::new().with("textName", "label"), None),
        ];
        for (symbol, expected) in cases {
            let name = registry
                .dispatch(Some(&symbol), &marker(), &options)
                .map(|s| s.name());
            assert_eq!(name, expected, "{:?}", symbol);
        }
    }

    #[test]
    fn test_predicates_are_total() {
        let registry = SymbolizerRegistry::default();
        let weird = [
            Symbol::new(),
            Symbol::new().with("markerFile", 3.0),
            Symbol::new().with("markerType", 1.0),
            Symbol::new().with("markerType", "path"),
            Symbol::from_json(r#"{"markerFile": null, "markerWidth": "wide"}"#).unwrap(),
        ];
        for kind in &registry.kinds {
            assert!(!kind.test(None));
            for symbol in &weird {
                let _ = kind.test(Some(symbol));
            }
        }
    }
}
