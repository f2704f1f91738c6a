use crate::core::geo::{LatLngBounds, Point};
use crate::core::viewport::Viewport;
use crate::data::table::TableRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerType {
    /// Rows of a hosted table drawn as point features
    Table,
    Custom,
}

impl std::fmt::Display for LayerType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LayerType::Table => write!(f, "table"),
            LayerType::Custom => write!(f, "custom"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LayerProperties {
    pub id: String,
    pub name: String,
    pub layer_type: LayerType,
    pub z_index: i32,
    pub visible: bool,
    pub interactive: bool,
    /// Opaque settings handed to the rendering service
    pub options: serde_json::Value,
}

impl LayerProperties {
    pub fn new(id: String, name: String, layer_type: LayerType) -> Self {
        Self {
            id,
            name,
            layer_type,
            z_index: 0,
            visible: true,
            interactive: true,
            options: serde_json::Value::Null,
        }
    }
}

/// A layer attached to a [`Map`](crate::core::map::Map).
///
/// Drawing belongs to the external renderer; the map only needs identity,
/// ordering, visibility and hit-testing.
pub trait LayerTrait: Send + Sync {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn layer_type(&self) -> LayerType;

    fn z_index(&self) -> i32;

    fn set_z_index(&mut self, z_index: i32);

    fn is_visible(&self) -> bool;

    fn set_visible(&mut self, visible: bool);

    /// Whether clicks are tested against this layer
    fn is_interactive(&self) -> bool {
        true
    }

    fn options(&self) -> serde_json::Value;

    fn bounds(&self) -> Option<LatLngBounds> {
        None
    }

    /// The feature under a container pixel, if any
    fn feature_at(&self, _viewport: &Viewport, _pixel: &Point) -> Option<TableRow> {
        None
    }

    fn as_any(&self) -> &dyn std::any::Any;

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_properties() {
        let props = LayerProperties::new(
            "test".to_string(),
            "Test Layer".to_string(),
            LayerType::Table,
        );

        assert_eq!(props.id, "test");
        assert_eq!(props.z_index, 0);
        assert!(props.visible);
        assert!(props.interactive);
        assert_eq!(props.layer_type.to_string(), "table");
    }
}
