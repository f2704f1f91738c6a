//! Prelude module for common stationmap types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use stationmap::prelude::*;`

pub use crate::core::{
    builder::SessionBuilder,
    config::{
        ControlOptions, ControlPosition, GeocoderConfig, MapConfig, MapType, OverlayConfig,
        SessionConfig,
    },
    geo::{LatLng, LatLngBounds, Point},
    map::Map,
    selection::{Coordinate, SelectedStation, SelectionEvent},
    session::{MapSession, PanOutcome},
    viewport::Viewport,
};

pub use crate::data::table::{
    CellValue, CsvTableSource, HttpTableSource, InMemoryTableSource, TableQuery, TableRow,
    TableSource,
};

pub use crate::geocoding::{
    cache::CachingGeocoder, http::HttpGeocoder, GeocodeGeometry, GeocodeRequest, GeocodeResponse,
    GeocodeResult, Geocoder, GeocoderStatus,
};

pub use crate::input::{
    events::{InputEvent, MapEvent, MouseButton},
    handler::{EventCallback, EventManager},
};

pub use crate::layers::{
    base::{LayerProperties, LayerTrait, LayerType},
    manager::LayerManager,
    table::TableLayer,
};

pub use crate::spatial::index::{SpatialIndex, SpatialItem};

pub use crate::{Error as MapError, Result};

pub use std::sync::Arc;

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
