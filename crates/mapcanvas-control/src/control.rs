use mapcanvas_core::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::position::{Offsets, Position};

/// Lifecycle notifications, drained with [`Control::take_events`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlEvent {
    Add,
    Remove,
    PositionChange(Offsets),
}

/// An overlay panel pinned to the host surface at a corner or offset.
#[derive(Debug, Clone, Default)]
pub struct Control {
    position: Option<Position>,
    host: Option<Size>,
    hidden: bool,
    placed: Option<Offsets>,
    events: Vec<ControlEvent>,
}

impl Control {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(position: impl Into<Position>) -> Self {
        Self {
            position: Some(position.into()),
            ..Self::default()
        }
    }

    /// Attaches to a host of the given size, detaching from any previous one first.
    pub fn add_to(&mut self, host_size: Size) {
        self.remove();
        self.host = Some(host_size);
        self.hidden = false;
        self.update_position();
        self.events.push(ControlEvent::Add);
    }

    pub fn remove(&mut self) {
        if self.host.take().is_none() {
            return;
        }
        self.placed = None;
        self.events.push(ControlEvent::Remove);
    }

    pub fn is_attached(&self) -> bool {
        self.host.is_some()
    }

    pub fn host_size(&self) -> Option<Size> {
        self.host
    }

    /// The resolved offsets; top-left at 20px if none was set.
    pub fn position(&self) -> Offsets {
        self.position
            .map(|p| p.resolve())
            .filter(|o| !o.is_empty())
            .unwrap_or_else(|| Offsets::new().top(20.0).left(20.0))
    }

    pub fn set_position(&mut self, position: impl Into<Position>) {
        self.position = Some(position.into());
        if self.is_attached() {
            self.update_position();
        }
    }

    /// Offsets applied at the last placement, if attached.
    pub fn placed(&self) -> Option<Offsets> {
        self.placed
    }

    pub fn on_host_resize(&mut self, host_size: Size) {
        if self.host.is_none() {
            return;
        }
        self.host = Some(host_size);
        self.update_position();
    }

    /// The control's anchor in host pixels. `None` when detached.
    pub fn container_point(&self) -> Option<Point> {
        let size = self.host?;
        let offsets = self.position();
        let x = match (offsets.left, offsets.right) {
            (Some(left), _) => left,
            (None, Some(right)) => size.width - right,
            (None, None) => 0.0,
        };
        let y = match (offsets.top, offsets.bottom) {
            (Some(top), _) => top,
            (None, Some(bottom)) => size.height - bottom,
            (None, None) => 0.0,
        };
        Some(Point::new(x, y))
    }

    pub fn show(&mut self) {
        self.hidden = false;
    }

    pub fn hide(&mut self) {
        self.hidden = true;
    }

    pub fn is_visible(&self) -> bool {
        self.is_attached() && !self.hidden
    }

    pub fn take_events(&mut self) -> Vec<ControlEvent> {
        std::mem::take(&mut self.events)
    }

    fn update_position(&mut self) {
        let offsets = self.position();
        log::debug!("Control placed at {:?}", offsets);
        self.placed = Some(offsets);
        self.events.push(ControlEvent::PositionChange(offsets));
    }
}
