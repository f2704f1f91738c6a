//! Session configuration
//!
//! Every field defaults to the fixed station-map setup, so an empty JSON
//! object (or no file at all) yields the standard map. Files only need to
//! name the values they override.

use crate::core::constants::*;
use crate::core::geo::{LatLng, Point};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Base map style requested from the rendering service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MapType {
    #[default]
    Roadmap,
    Satellite,
    Hybrid,
    Terrain,
}

/// Screen corner a control is pinned to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlPosition {
    #[default]
    LeftTop,
    TopLeft,
    TopRight,
    RightTop,
    LeftBottom,
    BottomLeft,
    BottomRight,
    RightBottom,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlOptions {
    pub pan_control: bool,
    pub pan_position: ControlPosition,
    pub zoom_control: bool,
    pub zoom_position: ControlPosition,
    pub street_view_control: bool,
}

impl Default for ControlOptions {
    fn default() -> Self {
        Self {
            pan_control: true,
            pan_position: ControlPosition::LeftTop,
            zoom_control: true,
            zoom_position: ControlPosition::LeftTop,
            street_view_control: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub center: LatLng,
    pub zoom: f64,
    pub map_type: MapType,
    /// Initial canvas size in pixels
    pub size: Point,
    pub controls: ControlOptions,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            center: LatLng::new(DEFAULT_CENTER_LAT, DEFAULT_CENTER_LNG),
            zoom: DEFAULT_ZOOM,
            map_type: MapType::Roadmap,
            size: Point::new(DEFAULT_CANVAS_SIZE.0, DEFAULT_CANVAS_SIZE.1),
            controls: ControlOptions::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Location column named by the overlay query
    pub select: String,
    /// Table key of the dataset
    pub from: String,
    pub style_id: u32,
    pub template_id: u32,
    /// Query endpoint of the table service
    pub endpoint: String,
    pub api_key: Option<String>,
    pub hit_tolerance_px: f64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            select: STATION_LOCATION_COLUMN.to_string(),
            from: STATION_TABLE_ID.to_string(),
            style_id: STATION_STYLE_ID,
            template_id: STATION_TEMPLATE_ID,
            endpoint: DEFAULT_TABLE_ENDPOINT.to_string(),
            api_key: None,
            hit_tolerance_px: DEFAULT_HIT_TOLERANCE_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocoderConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
    /// Number of answers memoized; 0 disables the cache
    pub cache_size: usize,
    pub timeout_secs: u64,
}

impl Default for GeocoderConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            api_key: None,
            cache_size: DEFAULT_GEOCODE_CACHE_SIZE,
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

/// Complete configuration of a [`MapSession`](crate::core::session::MapSession)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct SessionConfig {
    pub map: MapConfig,
    pub overlay: OverlayConfig,
    pub geocoder: GeocoderConfig,
}

impl SessionConfig {
    /// Parses a configuration from JSON text
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: SessionConfig = serde_json::from_str(text).map_err(MapError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads a configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        log::debug!("Loading session config from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(MapError::from)?;
        Self::from_json_str(&text)
    }

    /// Serializes the configuration as pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self).map_err(MapError::from)?)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.map.center.is_valid() {
            return Err(Box::new(MapError::InvalidCoordinates(format!(
                "map center {:?} is out of range",
                self.map.center
            ))));
        }
        if !(MIN_ZOOM..=MAX_ZOOM).contains(&self.map.zoom) {
            return Err(Box::new(MapError::ParseError(format!(
                "zoom {} is outside {}..={}",
                self.map.zoom, MIN_ZOOM, MAX_ZOOM
            ))));
        }
        if self.map.size.x <= 0.0 || self.map.size.y <= 0.0 {
            return Err(Box::new(MapError::ParseError(
                "map size must be positive".to_string(),
            )));
        }
        if self.overlay.from.trim().is_empty() {
            return Err(Box::new(MapError::ParseError(
                "overlay table id is empty".to_string(),
            )));
        }
        if self.overlay.hit_tolerance_px < 0.0 {
            return Err(Box::new(MapError::ParseError(
                "hit tolerance must not be negative".to_string(),
            )));
        }
        if self.geocoder.timeout_secs == 0 {
            return Err(Box::new(MapError::ParseError(
                "geocoder timeout must be at least one second".to_string(),
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_station_setup() {
        let config = SessionConfig::default();

        assert_eq!(config.map.center, LatLng::new(45.0, -100.0));
        assert_eq!(config.map.zoom, 3.0);
        assert_eq!(config.map.map_type, MapType::Roadmap);
        assert!(config.map.controls.pan_control);
        assert!(!config.map.controls.street_view_control);
        assert_eq!(config.map.controls.zoom_position, ControlPosition::LeftTop);
        assert_eq!(config.overlay.from, "13FX5mgB5H3ET6XXh9MdyViJzO2XXFoJVw6frvh0V");
        assert_eq!(config.overlay.select, "Geocodable address");
        assert_eq!(config.overlay.style_id, 2);
        assert_eq!(config.overlay.template_id, 2);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SessionConfig::from_json_str(
            r#"{ "map": { "zoom": 5 }, "geocoder": { "api_key": "abc" } }"#,
        )
        .unwrap();

        assert_eq!(config.map.zoom, 5.0);
        assert_eq!(config.map.center, LatLng::new(45.0, -100.0));
        assert_eq!(config.geocoder.api_key.as_deref(), Some("abc"));
        assert_eq!(config.overlay, OverlayConfig::default());
    }

    #[test]
    fn test_json_round_trip() {
        let mut config = SessionConfig::default();
        config.map.map_type = MapType::Terrain;
        config.overlay.hit_tolerance_px = 4.0;

        let text = config.to_json_string().unwrap();
        assert!(text.contains("\"terrain\""));
        assert_eq!(SessionConfig::from_json_str(&text).unwrap(), config);
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(SessionConfig::from_json_str(r#"{ "map": { "zoom": 40 } }"#).is_err());
        assert!(
            SessionConfig::from_json_str(r#"{ "map": { "center": { "lat": 120, "lng": 0 } } }"#)
                .is_err()
        );
        assert!(SessionConfig::from_json_str(r#"{ "overlay": { "from": " " } }"#).is_err());
        assert!(SessionConfig::from_json_str("not json").is_err());
    }

    #[test]
    fn test_rejects_zero_geocoder_timeout() {
        let err = SessionConfig::from_json_str(r#"{ "geocoder": { "timeout_secs": 0 } }"#)
            .unwrap_err();
        assert!(err.to_string().contains("geocoder timeout"));

        let mut config = SessionConfig::default();
        config.geocoder.timeout_secs = 1;
        assert!(config.validate().is_ok());
        config.geocoder.timeout_secs = 0;
        assert!(config.validate().is_err());
    }
}
