//! # MapCanvas Renderer
//!
//! Symbolizer pipeline that draws vector map geometries onto a 2D surface.
//! Projects geometries to device pixels (splitting shapes that wrap the
//! antimeridian), picks a symbolizer per style descriptor, decorates paths
//! with arrows and resolves marker images through a shared resource cache.
//!
//! Drawing goes through the [`RenderSurface`] trait. [`RecordingSurface`]
//! records JSON-serializable commands that a frontend canvas replays.

pub mod decoration;
pub mod draw;
pub mod options;
pub mod projector;
pub mod providers;
pub mod render_data;
pub mod renderer;
pub mod resources;
pub mod surface;
pub mod symbolizer;
pub mod viewport;

pub use decoration::{ArrowStyle, ArrowTable, PathDecoration};
pub use draw::{DrawCall, DrawOp, PaintStyle};
pub use options::{OptionsError, RenderOptions};
pub use projector::{DevicePath, Projection, Projector, RingKind};
pub use providers::{ProviderTable, ShapeResources};
pub use render_data::{RecordingSurface, SurfaceCommand};
pub use renderer::{RenderStats, VectorRenderer};
pub use resources::{
    ImageHandle, LoadChannel, LoadError, LoadResult, LoadSender, ResourceCache, ResourceKey,
    ResourceLoader,
};
pub use surface::{AlphaScope, RenderSurface, TransformScope};
pub use symbolizer::{
    ImageMarkerSymbolizer, MarkerState, RenderContext, StrokeAndFillSymbolizer, Symbolizer,
    SymbolizerKind, SymbolizerRegistry,
};
pub use viewport::Viewport;
