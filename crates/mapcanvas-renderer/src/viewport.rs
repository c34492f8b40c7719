use mapcanvas_core::{Coordinate, Point, Size};
use serde::{Deserialize, Serialize};

use crate::projector::Projection;

/// Projected x range of one world in EPSG:3857 metres.
pub const WEB_MERCATOR_HALF_WORLD: f64 = 20_037_508.342_789_244;

/// The current view onto projected map space.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Viewport {
    /// Center X in projected coordinates.
    pub center_x: f64,
    /// Center Y in projected coordinates.
    pub center_y: f64,
    /// Zoom (pixels per projected unit).
    pub zoom: f64,
    /// Canvas width in pixels.
    pub canvas_width: f64,
    /// Canvas height in pixels.
    pub canvas_height: f64,
    /// Projected x range of one world copy; `None` for unbounded projections.
    pub world: Option<(f64, f64)>,
}

impl Viewport {
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            center_x: 0.0,
            center_y: 0.0,
            zoom: 1.0,
            canvas_width,
            canvas_height,
            world: None,
        }
    }

    pub fn with_world(mut self, min_x: f64, max_x: f64) -> Self {
        self.world = Some((min_x, max_x));
        self
    }

    /// Pan the viewport by a delta in screen pixels.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.center_x -= dx / self.zoom;
        self.center_y += dy / self.zoom;
    }

    /// Zoom in/out keeping the projected point under the cursor fixed.
    pub fn zoom_at(&mut self, screen_x: f64, screen_y: f64, factor: f64) {
        let before = self.device_to_projected(&Point::new(screen_x, screen_y));

        self.zoom *= factor;
        self.zoom = self.zoom.clamp(1e-9, 1e9);

        let after = self.device_to_projected(&Point::new(screen_x, screen_y));
        self.center_x -= after.x - before.x;
        self.center_y -= after.y - before.y;
    }

    /// Zoom to fit a projected bounding box.
    pub fn fit_bounds(&mut self, min: Coordinate, max: Coordinate) {
        let width = max.x - min.x;
        let height = max.y - min.y;
        if width <= 0.0 || height <= 0.0 {
            return;
        }

        self.center_x = (min.x + max.x) / 2.0;
        self.center_y = (min.y + max.y) / 2.0;

        let zoom_x = self.canvas_width / width * 0.9; // 10% margin
        let zoom_y = self.canvas_height / height * 0.9;
        self.zoom = zoom_x.min(zoom_y);
    }

    pub fn device_to_projected(&self, p: &Point) -> Coordinate {
        Coordinate::new(
            (p.x - self.canvas_width / 2.0) / self.zoom + self.center_x,
            self.center_y - (p.y - self.canvas_height / 2.0) / self.zoom,
        )
    }

    /// The visible area as (south-west, north-east) projected corners.
    pub fn visible_bounds(&self) -> (Coordinate, Coordinate) {
        let half_w = self.canvas_width / (2.0 * self.zoom);
        let half_h = self.canvas_height / (2.0 * self.zoom);
        (
            Coordinate::new(self.center_x - half_w, self.center_y - half_h),
            Coordinate::new(self.center_x + half_w, self.center_y + half_h),
        )
    }
}

impl Projection for Viewport {
    fn projected_to_device(&self, c: &Coordinate) -> Point {
        Point::new(
            (c.x - self.center_x) * self.zoom + self.canvas_width / 2.0,
            (self.center_y - c.y) * self.zoom + self.canvas_height / 2.0,
        )
    }

    fn projected_to_device_size(&self, size: Size) -> Size {
        Size::new(size.width * self.zoom, size.height * self.zoom)
    }

    fn world_extent(&self) -> Option<(f64, f64)> {
        self.world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_maps_to_canvas_middle() {
        let vp = Viewport::new(800.0, 600.0);
        let p = vp.projected_to_device(&Coordinate::new(0.0, 0.0));
        assert!((p.x - 400.0).abs() < 1e-10);
        assert!((p.y - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_projected_y_points_up() {
        let vp = Viewport::new(800.0, 600.0);
        let north = vp.projected_to_device(&Coordinate::new(0.0, 10.0));
        assert!(north.y < 300.0);
    }

    #[test]
    fn test_device_round_trip() {
        let mut vp = Viewport::new(800.0, 600.0);
        vp.zoom = 2.5;
        vp.pan(30.0, -12.0);
        let c = Coordinate::new(17.0, -4.0);
        let back = vp.device_to_projected(&vp.projected_to_device(&c));
        assert!((back.x - c.x).abs() < 1e-10);
        assert!((back.y - c.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_fixed() {
        let mut vp = Viewport::new(800.0, 600.0);
        let cursor = Point::new(100.0, 200.0);
        let before = vp.device_to_projected(&cursor);
        vp.zoom_at(cursor.x, cursor.y, 4.0);
        let after = vp.device_to_projected(&cursor);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_fit_bounds() {
        let mut vp = Viewport::new(1000.0, 1000.0);
        vp.fit_bounds(Coordinate::new(0.0, 0.0), Coordinate::new(100.0, 50.0));
        assert!((vp.center_x - 50.0).abs() < 1e-10);
        assert!((vp.center_y - 25.0).abs() < 1e-10);
        assert!((vp.zoom - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_size_scales_with_zoom() {
        let mut vp = Viewport::new(100.0, 100.0);
        vp.zoom = 3.0;
        assert_eq!(
            vp.projected_to_device_size(Size::new(2.0, 5.0)),
            Size::new(6.0, 15.0)
        );
    }

    #[test]
    fn test_world_extent() {
        let vp = Viewport::new(100.0, 100.0).with_world(-WEB_MERCATOR_HALF_WORLD, WEB_MERCATOR_HALF_WORLD);
        assert!(vp.world_extent().is_some());
        assert!(Viewport::new(1.0, 1.0).world_extent().is_none());
    }
}
