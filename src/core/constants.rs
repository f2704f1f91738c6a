//! Fixed identifiers and defaults for the station map.
//! Everything here is also the default of the matching `SessionConfig` field.

/// Default map center latitude (continental North America).
pub const DEFAULT_CENTER_LAT: f64 = 45.0;

/// Default map center longitude.
pub const DEFAULT_CENTER_LNG: f64 = -100.0;

/// Default zoom level.
pub const DEFAULT_ZOOM: f64 = 3.0;

/// Zoom range supported by the viewport.
pub const MIN_ZOOM: f64 = 0.0;
pub const MAX_ZOOM: f64 = 18.0;

/// Square tile size in pixels at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Canvas size used until the host reports a real one.
pub const DEFAULT_CANVAS_SIZE: (f64, f64) = (800.0, 600.0);

/// Table key of the hosted station dataset.
pub const STATION_TABLE_ID: &str = "13FX5mgB5H3ET6XXh9MdyViJzO2XXFoJVw6frvh0V";

/// Location column selected by the overlay query.
pub const STATION_LOCATION_COLUMN: &str = "Geocodable address";

/// Style and info-window template identifiers of the overlay.
pub const STATION_STYLE_ID: u32 = 2;
pub const STATION_TEMPLATE_ID: u32 = 2;

/// Layer id the overlay is registered under.
pub const STATION_LAYER_ID: &str = "stations";

/// Column names read off a clicked row.
pub const STATION_NAME_FIELD: &str = "StationName";
pub const LATITUDE_FIELD: &str = "Latitude";
pub const LONGITUDE_FIELD: &str = "Longitude";

/// Name reported before any station has been selected.
pub const NO_SELECTION_NAME: &str = "none";

/// Text used for a coordinate that has never been set.
pub const UNDEFINED_COORDINATE: &str = "undefined";

/// Separator of the station id string.
pub const STATION_ID_SEPARATOR: char = ';';

/// Initial value of the info-window marker.
pub const LAST_INFO_UNSET: i32 = -1;

/// Click distance, in pixels, within which a station counts as hit.
pub const DEFAULT_HIT_TOLERANCE_PX: f64 = 10.0;

/// Hosted query endpoint for the station table.
pub const DEFAULT_TABLE_ENDPOINT: &str = "https://www.googleapis.com/fusiontables/v2/query";

/// Hosted geocoding endpoint.
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Number of geocode answers kept by the caching geocoder.
pub const DEFAULT_GEOCODE_CACHE_SIZE: usize = 64;

/// HTTP timeout for remote calls, in seconds.
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
