//! The render pass driver.
//!
//! A pass drains finished image loads, then walks the scene in order and
//! hands each geometry to the symbolizers built for its style. Symbolizers
//! are built once per geometry and kept until the geometry's style changes
//! or it leaves the scene. Invalidation signals raised during a pass only
//! mark the geometry dirty; the corrected output appears on the next pass.

use std::collections::HashMap;

use mapcanvas_core::{ExtentIndex, Geometry, GeometryId, Scene, StyleDescriptor};

use crate::options::RenderOptions;
use crate::projector::{Projection, Projector};
use crate::providers::ProviderTable;
use crate::resources::{LoadChannel, ResourceCache, ResourceLoader};
use crate::surface::RenderSurface;
use crate::symbolizer::{RenderContext, Symbolizer, SymbolizerRegistry};

/// Outcome of one render pass.
#[derive(Debug, Default)]
pub struct RenderStats {
    /// Geometries in the scene.
    pub geometries: usize,
    /// Geometries for which at least one symbolizer drew something.
    pub symbolized: usize,
    /// Geometries that drew nothing this pass.
    pub skipped: usize,
    /// Geometries that asked to be redrawn.
    pub invalidated: Vec<GeometryId>,
    /// Device-space extents drawn this pass.
    pub hit_index: ExtentIndex,
}

/// Per-geometry symbolizers plus the style they were built from.
#[derive(Debug)]
struct Painter {
    symbol: Option<StyleDescriptor>,
    symbolizers: Vec<Box<dyn Symbolizer>>,
    dirty: bool,
}

impl Painter {
    fn build(geometry: &Geometry, registry: &SymbolizerRegistry, options: &RenderOptions) -> Self {
        let symbolizers = match &geometry.symbol {
            Some(descriptor) => descriptor
                .entries()
                .iter()
                .filter_map(|symbol| registry.dispatch(Some(symbol), geometry, options))
                .collect(),
            None => registry.dispatch(None, geometry, options).into_iter().collect(),
        };
        Self {
            symbol: geometry.symbol.clone(),
            symbolizers,
            dirty: true,
        }
    }
}

#[derive(Debug)]
pub struct VectorRenderer {
    registry: SymbolizerRegistry,
    providers: ProviderTable,
    options: RenderOptions,
    resources: ResourceCache,
    loads: LoadChannel,
    painters: HashMap<GeometryId, Painter>,
}

impl VectorRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self::with_registry(options, SymbolizerRegistry::default(), ProviderTable::default())
    }

    pub fn with_registry(
        options: RenderOptions,
        registry: SymbolizerRegistry,
        providers: ProviderTable,
    ) -> Self {
        Self {
            registry,
            providers,
            options,
            resources: ResourceCache::new(),
            loads: LoadChannel::new(),
            painters: HashMap::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    pub fn resources_mut(&mut self) -> &mut ResourceCache {
        &mut self.resources
    }

    pub fn loads(&self) -> &LoadChannel {
        &self.loads
    }

    /// Applies finished loads to the cache and marks the geometries that
    /// requested them dirty. Returns those still in the renderer.
    pub fn poll_loads(&mut self) -> Vec<GeometryId> {
        let stale = self.loads.drain(&mut self.resources);
        stale
            .into_iter()
            .filter(|id| match self.painters.get_mut(id) {
                Some(painter) => {
                    painter.dirty = true;
                    true
                }
                None => false,
            })
            .collect()
    }

    /// Whether any geometry's last output is stale.
    pub fn needs_redraw(&self) -> bool {
        self.painters.values().any(|p| p.dirty)
    }

    pub fn is_dirty(&self, id: &GeometryId) -> bool {
        self.painters.get(id).is_some_and(|p| p.dirty)
    }

    /// Number of symbolizers currently built for `id`.
    pub fn symbolizer_count(&self, id: &GeometryId) -> usize {
        self.painters.get(id).map_or(0, |p| p.symbolizers.len())
    }

    pub fn render(
        &mut self,
        scene: &Scene,
        projection: &dyn Projection,
        surface: &mut dyn RenderSurface,
        loader: &mut dyn ResourceLoader,
    ) -> RenderStats {
        self.poll_loads();

        let VectorRenderer {
            registry,
            providers,
            options,
            resources,
            loads,
            painters,
        } = self;
        let (registry, providers, options) = (&*registry, &*providers, &*options);

        painters.retain(|id, _| scene.contains(id));

        let projector = Projector::new(projection, options.antimeridian);
        let mut stats = RenderStats {
            geometries: scene.len(),
            ..Default::default()
        };
        let mut invalidations = Vec::new();

        for geometry in scene.iter() {
            let painter = painters
                .entry(geometry.id)
                .or_insert_with(|| Painter::build(geometry, registry, options));
            if painter.symbol != geometry.symbol {
                *painter = Painter::build(geometry, registry, options);
            }
            painter.dirty = false;

            for symbolizer in &painter.symbolizers {
                for key in symbolizer.resource_keys() {
                    if !resources.is_resource_loaded(&key) {
                        loads.request(key, geometry.id, loader);
                    }
                }
            }

            let mut ctx = RenderContext::new(
                projector,
                providers,
                &mut *resources,
                options,
                &mut invalidations,
                &mut stats.hit_index,
            );
            let mut drew = false;
            for symbolizer in painter.symbolizers.iter_mut() {
                drew |= symbolizer.symbolize(geometry, surface, &mut ctx);
            }
            if drew {
                stats.symbolized += 1;
            } else {
                stats.skipped += 1;
            }
        }

        for id in invalidations {
            if let Some(painter) = painters.get_mut(&id) {
                painter.dirty = true;
                stats.invalidated.push(id);
            }
        }

        log::trace!(
            "Render pass: {} geometries, {} drawn, {} skipped, {} invalidated",
            stats.geometries,
            stats.symbolized,
            stats.skipped,
            stats.invalidated.len()
        );
        stats
    }
}

impl Default for VectorRenderer {
    fn default() -> Self {
        Self::new(RenderOptions::default())
    }
}
