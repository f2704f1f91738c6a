//! # stationmap
//!
//! A map session for browsing observation stations.
//!
//! The session owns a map view, overlays a tabular station dataset as a
//! clickable layer, remembers the last station that was clicked and keeps the
//! view centered across resizes. Geocoding and the remote table are reached
//! through the [`Geocoder`] and [`TableSource`] traits.

pub mod core;
pub mod data;
pub mod geocoding;
pub mod input;
pub mod layers;
pub mod prelude;
pub mod runtime;
pub mod spatial;
pub use crate::core::constants;

// Re-export public API
pub use core::{
    config::SessionConfig,
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    selection::{Coordinate, SelectedStation, SelectionEvent},
    session::{MapSession, PanOutcome},
    viewport::Viewport,
};

pub use data::table::{CellValue, TableQuery, TableRow, TableSource};

pub use geocoding::{GeocodeRequest, GeocodeResponse, Geocoder, GeocoderStatus};

pub use input::{events::InputEvent, events::MapEvent, handler::EventManager};

pub use layers::{base::LayerTrait, table::TableLayer};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    #[error("Layer error: {0}")]
    Layer(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Map has not been initialized")]
    NotInitialized,

    #[error("Malformed selection: field `{field}` is missing or invalid")]
    MalformedSelection { field: String },

    #[error("Geocoding error: {0}")]
    Geocoding(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Error type alias for convenience
pub type Error = MapError;
