use crate::core::geo::{LatLng, Point};
use crate::data::table::TableRow;
use serde::{Deserialize, Serialize};

/// Host notifications forwarded to the session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InputEvent {
    /// Single click/tap on the map canvas
    Click {
        position: Point,
        button: MouseButton,
    },
    /// Window/container resize
    Resize { size: Point },
}

/// Mouse button types
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

impl InputEvent {
    /// Gets the primary position associated with this event, if any
    pub fn position(&self) -> Option<Point> {
        match self {
            InputEvent::Click { position, .. } => Some(*position),
            InputEvent::Resize { .. } => None,
        }
    }
}

/// Map event types that can be emitted by the map
#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    /// Map view has changed (center or zoom)
    ViewChanged { center: LatLng, zoom: f64 },
    /// Canvas size changed
    Resize { size: Point },
    /// Click on the map that hit no feature
    Click { lat_lng: LatLng, pixel: Point },
    /// Click on a feature of an overlay layer
    FeatureClick {
        layer_id: String,
        row: TableRow,
        lat_lng: LatLng,
    },
    /// Layer was added to the map
    LayerAdd { layer_id: String },
    /// Layer was removed from the map
    LayerRemove { layer_id: String },
    /// Overlay rows arrived
    OverlayLoaded { layer_id: String, rows: usize },
    /// Overlay rows could not be loaded
    OverlayError { layer_id: String, message: String },
}

impl MapEvent {
    /// Name listeners register under
    pub fn event_type(&self) -> &'static str {
        match self {
            MapEvent::ViewChanged { .. } => "viewchanged",
            MapEvent::Resize { .. } => "resize",
            MapEvent::Click { .. } => "click",
            MapEvent::FeatureClick { .. } => "featureclick",
            MapEvent::LayerAdd { .. } => "layeradd",
            MapEvent::LayerRemove { .. } => "layerremove",
            MapEvent::OverlayLoaded { .. } => "overlayloaded",
            MapEvent::OverlayError { .. } => "overlayerror",
        }
    }
}
