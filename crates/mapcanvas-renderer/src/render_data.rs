use mapcanvas_core::{Matrix, Point, PointExtent, Size};
use serde::{Deserialize, Serialize};

use crate::resources::ImageHandle;
use crate::surface::RenderSurface;

/// One primitive call, as received by a [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum SurfaceCommand {
    Path {
        points: Vec<Point>,
        line_opacity: f64,
        fill_opacity: Option<f64>,
        dash: Option<Vec<f64>>,
    },
    Polygon {
        rings: Vec<Vec<Point>>,
        line_opacity: f64,
        fill_opacity: f64,
    },
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
    Image {
        image: ImageHandle,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        /// Transform active when the image was drawn.
        transform: Matrix,
        /// Global alpha active when the image was drawn.
        alpha: f64,
    },
}

impl SurfaceCommand {
    pub fn op(&self) -> &'static str {
        match self {
            SurfaceCommand::Path { .. } => "path",
            SurfaceCommand::Polygon { .. } => "polygon",
            SurfaceCommand::Ellipse { .. } => "ellipse",
            SurfaceCommand::Rectangle { .. } => "rectangle",
            SurfaceCommand::Sector { .. } => "sector",
            SurfaceCommand::Image { .. } => "image",
        }
    }

    /// For images, the device-space corners of the drawn rectangle
    /// (top-left, top-right, bottom-right, bottom-left).
    pub fn image_corners(&self) -> Option<[Point; 4]> {
        match self {
            SurfaceCommand::Image {
                x,
                y,
                width,
                height,
                transform,
                ..
            } => Some([
                transform.apply(&Point::new(*x, *y)),
                transform.apply(&Point::new(x + width, *y)),
                transform.apply(&Point::new(x + width, y + height)),
                transform.apply(&Point::new(*x, y + height)),
            ]),
            _ => None,
        }
    }
}

/// A surface that records every call instead of rasterizing it.
///
/// The recorded commands serialize to JSON for a frontend canvas to replay.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
    transform: Matrix,
    stack: Vec<Matrix>,
    alpha: f64,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self {
            commands: Vec::new(),
            transform: Matrix::identity(),
            stack: Vec::new(),
            alpha: 1.0,
        }
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn count(&self, op: &str) -> usize {
        self.commands.iter().filter(|c| c.op() == op).count()
    }

    /// Number of transforms currently pushed.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn transform(&self) -> Matrix {
        self.transform
    }

    /// Union of the device-space extents of all recorded images.
    pub fn image_extent(&self) -> Option<PointExtent> {
        let corners: Vec<Point> = self
            .commands
            .iter()
            .filter_map(SurfaceCommand::image_corners)
            .flatten()
            .collect();
        PointExtent::from_points(&corners)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.commands)
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderSurface for RecordingSurface {
    fn path(
        &mut self,
        points: &[Point],
        line_opacity: f64,
        fill_opacity: Option<f64>,
        dash: Option<&[f64]>,
    ) {
        self.commands.push(SurfaceCommand::Path {
            points: points.to_vec(),
            line_opacity,
            fill_opacity,
            dash: dash.map(<[f64]>::to_vec),
        });
    }

    fn polygon(&mut self, rings: &[Vec<Point>], line_opacity: f64, fill_opacity: f64) {
        self.commands.push(SurfaceCommand::Polygon {
            rings: rings.to_vec(),
            line_opacity,
            fill_opacity,
        });
    }

    fn ellipse(&mut self, center: Point, width: f64, height: f64) {
        self.commands.push(SurfaceCommand::Ellipse {
            center,
            width,
            height,
        });
    }

    fn rectangle(&mut self, top_left: Point, size: Size) {
        self.commands
            .push(SurfaceCommand::Rectangle { top_left, size });
    }

    fn sector(&mut self, center: Point, radius: f64, angles: [f64; 2]) {
        self.commands.push(SurfaceCommand::Sector {
            center,
            radius,
            angles,
        });
    }

    fn image(&mut self, image: &ImageHandle, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(SurfaceCommand::Image {
            image: image.clone(),
            x,
            y,
            width,
            height,
            transform: self.transform,
            alpha: self.alpha,
        });
    }

    fn push_transform(&mut self) {
        self.stack.push(self.transform);
    }

    fn pop_transform(&mut self) {
        if let Some(saved) = self.stack.pop() {
            self.transform = saved;
        }
    }

    fn translate(&mut self, x: f64, y: f64) {
        self.transform = self.transform.translate(x, y);
    }

    fn rotate(&mut self, angle: f64) {
        self.transform = self.transform.rotate(angle);
    }

    fn global_alpha(&self) -> f64 {
        self.alpha
    }

    fn set_global_alpha(&mut self, alpha: f64) {
        self.alpha = alpha;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_commands_in_order() {
        let mut surface = RecordingSurface::new();
        surface.ellipse(Point::new(1.0, 2.0), 3.0, 4.0);
        surface.rectangle(Point::new(0.0, 0.0), Size::new(5.0, 5.0));
        let ops: Vec<_> = surface.commands().iter().map(SurfaceCommand::op).collect();
        assert_eq!(ops, vec!["ellipse", "rectangle"]);
    }

    #[test]
    fn test_image_captures_transform() {
        let mut surface = RecordingSurface::new();
        let image = ImageHandle::new("a.png", 10.0, 20.0);
        surface.push_transform();
        surface.translate(100.0, 50.0);
        surface.image(&image, -5.0, -20.0, 10.0, 20.0);
        surface.pop_transform();

        let corners = surface.commands()[0].image_corners().unwrap();
        assert_eq!(corners[0], Point::new(95.0, 30.0));
        assert_eq!(corners[2], Point::new(105.0, 50.0));
        assert!(surface.transform().is_identity());
    }

    #[test]
    fn test_commands_serialize_with_op_tag() {
        let mut surface = RecordingSurface::new();
        surface.sector(Point::new(0.0, 0.0), 10.0, [0.0, 90.0]);
        let json = surface.to_json().unwrap();
        assert!(json.contains("\"op\":\"sector\""));
        let back: Vec<SurfaceCommand> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, surface.commands());
    }
}
