use std::ops::{Deref, DerefMut};

use mapcanvas_core::{Point, Size};

use crate::resources::ImageHandle;

/// The 2D drawing primitives the pipeline draws with.
///
/// Transform and opacity state are scoped through [`TransformScope`] and
/// [`AlphaScope`] rather than called directly.
pub trait RenderSurface {
    fn path(
        &mut self,
        points: &[Point],
        line_opacity: f64,
        fill_opacity: Option<f64>,
        dash: Option<&[f64]>,
    );

    /// Draws one polygon; `rings[0]` is the shell, the rest are holes.
    fn polygon(&mut self, rings: &[Vec<Point>], line_opacity: f64, fill_opacity: f64);

    /// `width` and `height` are the semi-axes.
    fn ellipse(&mut self, center: Point, width: f64, height: f64);

    fn rectangle(&mut self, top_left: Point, size: Size);

    /// Angles in degrees.
    fn sector(&mut self, center: Point, radius: f64, angles: [f64; 2]);

    fn image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64);

    fn push_transform(&mut self);

    fn pop_transform(&mut self);

    fn translate(&mut self, x: f64, y: f64);

    /// Radians.
    fn rotate(&mut self, angle: f64);

    fn global_alpha(&self) -> f64;

    fn set_global_alpha(&mut self, alpha: f64);
}

/// Pushes a transform on creation and pops it on drop.
pub struct TransformScope<'a> {
    surface: &'a mut dyn RenderSurface,
}

impl<'a> TransformScope<'a> {
    pub fn new(surface: &'a mut dyn RenderSurface) -> Self {
        surface.push_transform();
        Self { surface }
    }
}

impl<'a> Deref for TransformScope<'a> {
    type Target = dyn RenderSurface + 'a;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<'a> DerefMut for TransformScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for TransformScope<'_> {
    fn drop(&mut self) {
        self.surface.pop_transform();
    }
}

/// Multiplies the global alpha by `factor` and restores the previous value on drop.
pub struct AlphaScope<'a> {
    surface: &'a mut dyn RenderSurface,
    saved: f64,
}

impl<'a> AlphaScope<'a> {
    pub fn new(surface: &'a mut dyn RenderSurface, factor: f64) -> Self {
        let saved = surface.global_alpha();
        surface.set_global_alpha(saved * factor);
        Self { surface, saved }
    }
}

impl<'a> Deref for AlphaScope<'a> {
    type Target = dyn RenderSurface + 'a;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<'a> DerefMut for AlphaScope<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for AlphaScope<'_> {
    fn drop(&mut self) {
        self.surface.set_global_alpha(self.saved);
    }
}
