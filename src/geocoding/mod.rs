//! Geocoding: free-text location to center point and viewport.
//!
//! The wire types follow the JSON shape of the hosted geocoding service, so
//! `HttpGeocoder` can deserialize answers directly.

pub mod cache;
pub mod http;

use crate::core::geo::{LatLng, LatLngBounds};
use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use cache::CachingGeocoder;
pub use http::HttpGeocoder;

/// Status reported with every geocoding answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GeocoderStatus {
    Ok,
    ZeroResults,
    OverQueryLimit,
    RequestDenied,
    InvalidRequest,
    UnknownError,
    Error,
    #[serde(other)]
    Unrecognized,
}

impl std::fmt::Display for GeocoderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            GeocoderStatus::Ok => "OK",
            GeocoderStatus::ZeroResults => "ZERO_RESULTS",
            GeocoderStatus::OverQueryLimit => "OVER_QUERY_LIMIT",
            GeocoderStatus::RequestDenied => "REQUEST_DENIED",
            GeocoderStatus::InvalidRequest => "INVALID_REQUEST",
            GeocoderStatus::UnknownError => "UNKNOWN_ERROR",
            GeocoderStatus::Error => "ERROR",
            GeocoderStatus::Unrecognized => "UNRECOGNIZED",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeocodeRequest {
    pub address: String,
    /// Region bias, e.g. `"us"`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl GeocodeRequest {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            region: None,
        }
    }

    /// Key used to memoize answers: trimmed, lowercased address plus region
    pub fn cache_key(&self) -> String {
        let address = self.address.trim().to_lowercase();
        match &self.region {
            Some(region) => format!("{}|{}", address, region.to_lowercase()),
            None => address,
        }
    }
}

/// Viewport box in the service's `northeast`/`southwest` shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeViewport {
    pub northeast: LatLng,
    pub southwest: LatLng,
}

impl From<&GeocodeViewport> for LatLngBounds {
    fn from(viewport: &GeocodeViewport) -> Self {
        LatLngBounds::new(viewport.southwest, viewport.northeast)
    }
}

impl From<&LatLngBounds> for GeocodeViewport {
    fn from(bounds: &LatLngBounds) -> Self {
        Self {
            northeast: bounds.north_east,
            southwest: bounds.south_west,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeGeometry {
    pub location: LatLng,
    pub viewport: GeocodeViewport,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: String,
    pub geometry: GeocodeGeometry,
}

impl GeocodeResult {
    pub fn new(
        formatted_address: impl Into<String>,
        location: LatLng,
        viewport: LatLngBounds,
    ) -> Self {
        Self {
            formatted_address: formatted_address.into(),
            geometry: GeocodeGeometry {
                location,
                viewport: GeocodeViewport::from(&viewport),
            },
        }
    }

    pub fn location(&self) -> LatLng {
        self.geometry.location
    }

    pub fn viewport(&self) -> LatLngBounds {
        LatLngBounds::from(&self.geometry.viewport)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResponse {
    pub status: GeocoderStatus,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl GeocodeResponse {
    pub fn ok(results: Vec<GeocodeResult>) -> Self {
        Self {
            status: GeocoderStatus::Ok,
            results,
            error_message: None,
        }
    }

    pub fn with_status(status: GeocoderStatus) -> Self {
        Self {
            status,
            results: Vec::new(),
            error_message: None,
        }
    }

    /// First result of an OK answer. An OK answer with no results counts as a miss.
    pub fn best(&self) -> Option<&GeocodeResult> {
        match self.status {
            GeocoderStatus::Ok => self.results.first(),
            _ => None,
        }
    }

    /// Status as the caller should treat it
    pub fn effective_status(&self) -> GeocoderStatus {
        match (self.status, self.results.is_empty()) {
            (GeocoderStatus::Ok, true) => GeocoderStatus::ZeroResults,
            (status, _) => status,
        }
    }
}

/// Translates free text into a location and viewport
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse>;
}
