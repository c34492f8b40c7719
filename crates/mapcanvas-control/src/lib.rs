//! # MapCanvas Control
//!
//! Overlay controls pinned to a corner of the map surface. A control keeps
//! its position as a named preset or explicit pixel offsets and recomputes
//! its placement when attached, repositioned, or when the host resizes.

pub mod control;
pub mod position;

pub use control::{Control, ControlEvent};
pub use position::{ControlError, Corner, Offsets, Position};
