//! Image markers.
//!
//! The image is anchored at its bottom center on each placement point. When
//! `markerWidth`/`markerHeight` are not configured the marker starts
//! [`MarkerState::Unsized`]: it draws nothing until its image has loaded
//! under the unsized key, then adopts the intrinsic size on the next draw,
//! re-caches the image under the sized key and invalidates its geometry.

use std::f64::consts::PI;
use std::str::FromStr;

use mapcanvas_core::{Coordinate, Geometry, GeometryId, Point, PointExtent, StyleValue, Symbol};
use serde::{Deserialize, Serialize};

use super::{RenderContext, Symbolizer, SymbolizerKind};
use crate::options::RenderOptions;
use crate::projector::Projector;
use crate::resources::ResourceKey;
use crate::surface::{AlphaScope, RenderSurface, TransformScope};

const MARKER_FILE: &str = "markerFile";
const MARKER_PATH: &str = "markerPath";
const MARKER_WIDTH: &str = "markerWidth";
const MARKER_HEIGHT: &str = "markerHeight";
const MARKER_OPACITY: &str = "markerOpacity";

/// Where the source image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkerVariant {
    /// `markerFile`; opacity scales the surface's global alpha.
    Image,
    /// `markerPath`, rasterised by the loader with opacity already applied.
    VectorPath,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MarkerState {
    Unsized,
    Sized { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MarkerPlacement {
    /// The geometry's center.
    #[default]
    Point,
    Vertex,
    VertexFirst,
    VertexLast,
}

impl FromStr for MarkerPlacement {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(MarkerPlacement::Point),
            "vertex" => Ok(MarkerPlacement::Vertex),
            "vertex-first" => Ok(MarkerPlacement::VertexFirst),
            "vertex-last" => Ok(MarkerPlacement::VertexLast),
            other => Err(format!("Unknown marker placement: {}", other)),
        }
    }
}

fn defaults() -> Symbol {
    let mut symbol = Symbol::new()
        .with(MARKER_OPACITY, 1.0)
        .with("markerDx", 0.0)
        .with("markerDy", 0.0);
    symbol.insert(MARKER_WIDTH, StyleValue::Null);
    symbol.insert(MARKER_HEIGHT, StyleValue::Null);
    symbol
}

#[derive(Debug, Clone)]
pub struct ImageMarkerSymbolizer {
    variant: MarkerVariant,
    geometry: GeometryId,
    /// The descriptor merged over the defaults. Only `adopt_intrinsic_size` writes to it.
    style: Symbol,
    placement: MarkerPlacement,
}

impl ImageMarkerSymbolizer {
    pub fn new(variant: MarkerVariant, symbol: &Symbol, geometry: &Geometry) -> Self {
        let placement = symbol
            .string("markerPlacement")
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        Self {
            variant,
            geometry: geometry.id,
            style: symbol.merged_over(&defaults()),
            placement,
        }
    }

    pub fn variant(&self) -> MarkerVariant {
        self.variant
    }

    pub fn style(&self) -> &Symbol {
        &self.style
    }

    pub fn source(&self) -> Option<&str> {
        match self.variant {
            MarkerVariant::Image => self.style.string(MARKER_FILE),
            MarkerVariant::VectorPath => self.style.string(MARKER_PATH),
        }
    }

    /// The key the image is looked up under: unsized until a size is known.
    pub fn resource_key(&self) -> Option<ResourceKey> {
        Some(ResourceKey::new(
            self.source()?,
            self.style.number(MARKER_WIDTH),
            self.style.number(MARKER_HEIGHT),
        ))
    }

    pub fn placement(&self) -> MarkerPlacement {
        self.placement
    }

    /// `markerRotation` in radians, if set.
    pub fn rotation(&self) -> Option<f64> {
        self.style.number("markerRotation").map(|deg| deg * PI / 180.0)
    }

    pub fn dx_dy(&self) -> Point {
        Point::new(
            self.style.number("markerDx").unwrap_or(0.0),
            self.style.number("markerDy").unwrap_or(0.0),
        )
    }

    pub fn opacity(&self) -> f64 {
        self.style.number(MARKER_OPACITY).unwrap_or(1.0)
    }

    pub fn marker_state(&self) -> MarkerState {
        match (
            self.style.number(MARKER_WIDTH),
            self.style.number(MARKER_HEIGHT),
        ) {
            (Some(width), Some(height)) => MarkerState::Sized { width, height },
            _ => MarkerState::Unsized,
        }
    }

    /// The marker's box relative to its anchor, offset included. `None` while unsized.
    pub fn marker_extent(&self) -> Option<PointExtent> {
        let MarkerState::Sized { width, height } = self.marker_state() else {
            return None;
        };
        let dxdy = self.dx_dy();
        Some(PointExtent::new(
            dxdy.translate(-width / 2.0, 0.0),
            dxdy.translate(width / 2.0, -height),
        ))
    }

    /// Records the loaded image's size as the marker size. Only an unsized
    /// marker transitions; returns whether it did.
    pub fn adopt_intrinsic_size(&mut self, width: f64, height: f64) -> bool {
        if self.marker_state() != MarkerState::Unsized {
            return false;
        }
        self.style.insert(MARKER_WIDTH, width);
        self.style.insert(MARKER_HEIGHT, height);
        true
    }

    fn is_hidden(&self) -> bool {
        [MARKER_WIDTH, MARKER_HEIGHT, MARKER_OPACITY]
            .iter()
            .any(|key| self.style.number(key) == Some(0.0))
    }

    fn anchors(&self, geometry: &Geometry, projector: &Projector) -> Vec<Point> {
        let shape = &geometry.shape;
        let vertices = shape.prj_vertices();
        let coords: Vec<Coordinate> = match self.placement {
            MarkerPlacement::Point => shape.prj_center().into_iter().collect(),
            _ if vertices.is_empty() => shape.prj_center().into_iter().collect(),
            MarkerPlacement::Vertex => vertices.to_vec(),
            MarkerPlacement::VertexFirst => vertices[..1].to_vec(),
            MarkerPlacement::VertexLast => vertices[vertices.len() - 1..].to_vec(),
        };
        coords.iter().map(|c| projector.point(c)).collect()
    }
}

impl Symbolizer for ImageMarkerSymbolizer {
    fn name(&self) -> &'static str {
        match self.variant {
            MarkerVariant::Image => "image-marker",
            MarkerVariant::VectorPath => "vector-path-marker",
        }
    }

    fn symbolize(
        &mut self,
        geometry: &Geometry,
        surface: &mut dyn RenderSurface,
        ctx: &mut RenderContext,
    ) -> bool {
        if self.is_hidden() {
            return false;
        }
        let anchors = self.anchors(geometry, &ctx.projector);
        if anchors.is_empty() {
            return false;
        }
        let Some(key) = self.resource_key() else {
            return false;
        };
        let Some(image) = ctx.resources.get_image(&key).cloned() else {
            if !ctx.options.headless {
                log::warn!("No image found for {}", key);
            }
            return false;
        };

        if self.adopt_intrinsic_size(image.width, image.height) {
            let sized = ResourceKey::new(&key.source, Some(image.width), Some(image.height));
            log::debug!("Marker of {} sized from image: {}", geometry.id, sized);
            if !ctx.resources.is_resource_loaded(&sized) {
                ctx.resources.add_resource(sized, image.clone());
            }
            ctx.invalidate(self.geometry);
        }
        let MarkerState::Sized { width, height } = self.marker_state() else {
            return false;
        };

        let opacity = self.opacity();
        let factor = if self.variant == MarkerVariant::Image && opacity < 1.0 {
            opacity
        } else {
            1.0
        };
        let dxdy = self.dx_dy();
        let rotation = self.rotation();
        {
            let mut surface = AlphaScope::new(surface, factor);
            for anchor in &anchors {
                let p = anchor.add(&dxdy);
                match rotation {
                    Some(angle) => {
                        let mut scoped = TransformScope::new(&mut *surface);
                        scoped.translate(p.x, p.y);
                        scoped.rotate(angle);
                        scoped.image(&image, -width / 2.0, -height, width, height);
                    }
                    None => surface.image(&image, p.x - width / 2.0, p.y - height, width, height),
                }
            }
        }

        if let Some(extent) = self.marker_extent() {
            for anchor in &anchors {
                ctx.record_extent(geometry.id, extent.translate(anchor));
            }
        }
        true
    }

    fn resource_keys(&self) -> Vec<ResourceKey> {
        self.resource_key().into_iter().collect()
    }
}

/// Matches any symbol with a non-null `markerFile`.
#[derive(Debug, Clone, Copy)]
pub struct ImageMarkerKind;

impl SymbolizerKind for ImageMarkerKind {
    fn name(&self) -> &'static str {
        "image-marker"
    }

    fn test(&self, symbol: Option<&Symbol>) -> bool {
        symbol.is_some_and(|s| !s.is_nil(MARKER_FILE))
    }

    fn build(&self, symbol: &Symbol, geometry: &Geometry, _: &RenderOptions) -> Box<dyn Symbolizer> {
        Box::new(ImageMarkerSymbolizer::new(MarkerVariant::Image, symbol, geometry))
    }
}

/// Matches `markerType: "path"` with a non-null `markerPath`.
#[derive(Debug, Clone, Copy)]
pub struct VectorPathMarkerKind;

impl SymbolizerKind for VectorPathMarkerKind {
    fn name(&self) -> &'static str {
        "vector-path-marker"
    }

    fn test(&self, symbol: Option<&Symbol>) -> bool {
        symbol.is_some_and(|s| s.string("markerType") == Some("path") && !s.is_nil(MARKER_PATH))
    }

    fn build(&self, symbol: &Symbol, geometry: &Geometry, _: &RenderOptions) -> Box<dyn Symbolizer> {
        Box::new(ImageMarkerSymbolizer::new(
            MarkerVariant::VectorPath,
            symbol,
            geometry,
        ))
    }
}
