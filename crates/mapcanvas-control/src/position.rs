use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ControlError {
    #[error("Unknown control position: {0}")]
    UnknownPreset(String),
}

/// Named screen-corner anchors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Corner::TopLeft => "top-left",
            Corner::TopRight => "top-right",
            Corner::BottomLeft => "bottom-left",
            Corner::BottomRight => "bottom-right",
        }
    }

    /// The pixel offsets this preset stands for.
    pub fn offsets(&self) -> Offsets {
        match self {
            Corner::TopLeft => Offsets::new().top(20.0).left(20.0),
            Corner::TopRight => Offsets::new().top(40.0).right(60.0),
            Corner::BottomLeft => Offsets::new().bottom(20.0).left(60.0),
            Corner::BottomRight => Offsets::new().bottom(20.0).right(60.0),
        }
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Corner {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Corner::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| ControlError::UnknownPreset(s.to_string()))
    }
}

/// Pixel distances from the host's edges. Unset sides are ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Offsets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<f64>,
}

impl Offsets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top(mut self, v: f64) -> Self {
        self.top = Some(v);
        self
    }

    pub fn bottom(mut self, v: f64) -> Self {
        self.bottom = Some(v);
        self
    }

    pub fn left(mut self, v: f64) -> Self {
        self.left = Some(v);
        self
    }

    pub fn right(mut self, v: f64) -> Self {
        self.right = Some(v);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.top.is_none() && self.bottom.is_none() && self.left.is_none() && self.right.is_none()
    }
}

/// Where a control sits: a named preset or explicit offsets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Position {
    Preset(Corner),
    Offsets(Offsets),
}

impl Position {
    pub fn resolve(&self) -> Offsets {
        match self {
            Position::Preset(corner) => corner.offsets(),
            Position::Offsets(offsets) => *offsets,
        }
    }
}

impl From<Corner> for Position {
    fn from(corner: Corner) -> Self {
        Position::Preset(corner)
    }
}

impl From<Offsets> for Position {
    fn from(offsets: Offsets) -> Self {
        Position::Offsets(offsets)
    }
}

impl FromStr for Position {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Position::Preset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_offsets() {
        assert_eq!(Corner::TopLeft.offsets(), Offsets::new().top(20.0).left(20.0));
        assert_eq!(Corner::TopRight.offsets(), Offsets::new().top(40.0).right(60.0));
        assert_eq!(Corner::BottomLeft.offsets(), Offsets::new().bottom(20.0).left(60.0));
        assert_eq!(Corner::BottomRight.offsets(), Offsets::new().bottom(20.0).right(60.0));
    }

    #[test]
    fn test_parse_presets() {
        for corner in Corner::ALL {
            assert_eq!(corner.as_str().parse::<Corner>(), Ok(corner));
        }
        assert_eq!(
            "middle".parse::<Position>(),
            Err(ControlError::UnknownPreset("middle".to_string()))
        );
    }

    #[test]
    fn test_position_from_json() {
        let preset: Position = serde_json::from_str(r#""bottom-right""#).unwrap();
        assert_eq!(preset, Position::Preset(Corner::BottomRight));

        let explicit: Position = serde_json::from_str(r#"{"top": 40, "left": 60}"#).unwrap();
        assert_eq!(explicit.resolve(), Offsets::new().top(40.0).left(60.0));
    }

    #[test]
    fn test_offsets_serialize_only_set_sides() {
        let json = serde_json::to_string(&Offsets::new().bottom(5.0)).unwrap();
        assert_eq!(json, r#"{"bottom":5.0}"#);
    }
}
