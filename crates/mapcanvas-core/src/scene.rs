use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::geometry::Shape;
use crate::style::StyleDescriptor;

/// Stable identity of a geometry within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeometryId(pub Uuid);

impl GeometryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GeometryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GeometryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A shape plus the style it should be rendered with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    pub id: GeometryId,
    pub shape: Shape,
    pub symbol: Option<StyleDescriptor>,
}

impl Geometry {
    pub fn new(shape: Shape) -> Self {
        Self {
            id: GeometryId::new(),
            shape,
            symbol: None,
        }
    }

    pub fn with_symbol(mut self, symbol: impl Into<StyleDescriptor>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }
}

/// The set of geometries a renderer draws, in insertion (paint) order.
#[derive(Debug, Serialize, Deserialize)]
pub struct Scene {
    pub id: Uuid,
    geometries: HashMap<GeometryId, Geometry>,
    order: Vec<GeometryId>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            geometries: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Adds a geometry, replacing any geometry with the same id in place.
    pub fn add(&mut self, geometry: Geometry) -> GeometryId {
        let id = geometry.id;
        if self.geometries.insert(id, geometry).is_some() {
            log::debug!("Replaced geometry {}", id);
        } else {
            self.order.push(id);
        }
        id
    }

    pub fn get(&self, id: &GeometryId) -> Option<&Geometry> {
        self.geometries.get(id)
    }

    pub fn get_mut(&mut self, id: &GeometryId) -> Option<&mut Geometry> {
        self.geometries.get_mut(id)
    }

    pub fn remove(&mut self, id: &GeometryId) -> Option<Geometry> {
        let removed = self.geometries.remove(id)?;
        self.order.retain(|g| g != id);
        Some(removed)
    }

    pub fn contains(&self, id: &GeometryId) -> bool {
        self.geometries.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Geometry> {
        self.order.iter().filter_map(|id| self.geometries.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Coordinate;
    use crate::style::Symbol;

    fn marker(x: f64, y: f64) -> Geometry {
        Geometry::new(Shape::Marker(Coordinate::new(x, y)))
    }

    #[test]
    fn test_scene_preserves_paint_order() {
        let mut scene = Scene::new();
        let a = scene.add(marker(0.0, 0.0));
        let b = scene.add(marker(1.0, 1.0));
        let c = scene.add(marker(2.0, 2.0));
        let ids: Vec<_> = scene.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![a, b, c]);
    }

    #[test]
    fn test_remove_geometry() {
        let mut scene = Scene::new();
        let a = scene.add(marker(0.0, 0.0));
        let b = scene.add(marker(1.0, 1.0));
        assert!(scene.remove(&a).is_some());
        assert!(!scene.contains(&a));
        assert!(scene.remove(&a).is_none());
        assert_eq!(scene.iter().map(|g| g.id).collect::<Vec<_>>(), vec![b]);
    }

    #[test]
    fn test_readd_replaces_in_place() {
        let mut scene = Scene::new();
        let mut g = marker(0.0, 0.0);
        let id = scene.add(g.clone());
        g.shape = Shape::Marker(Coordinate::new(9.0, 9.0));
        scene.add(g);
        assert_eq!(scene.len(), 1);
        assert_eq!(
            scene.get(&id).unwrap().shape,
            Shape::Marker(Coordinate::new(9.0, 9.0))
        );
    }

    #[test]
    fn test_scene_json_round_trip() {
        let mut scene = Scene::new();
        let id = scene.add(marker(3.0, 4.0).with_symbol(Symbol::new().with("markerFile", "a.png")));
        let restored = Scene::from_json(&scene.to_json().unwrap()).unwrap();
        assert_eq!(restored.get(&id), scene.get(&id));
    }
}
