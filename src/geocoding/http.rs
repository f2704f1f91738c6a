use super::{GeocodeRequest, GeocodeResponse, Geocoder};
use crate::core::config::GeocoderConfig;
use crate::data::http::client_for_timeout;
use crate::{MapError, Result};
use async_trait::async_trait;
use std::time::Duration;

/// Geocoder backed by the hosted geocoding service's JSON API
#[derive(Debug, Clone)]
pub struct HttpGeocoder {
    endpoint: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpGeocoder {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key,
            client: client_for_timeout(timeout)?,
        })
    }

    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    fn query_params(&self, request: &GeocodeRequest) -> Vec<(&'static str, String)> {
        let mut params = vec![("address", request.address.clone())];
        if let Some(region) = &request.region {
            params.push(("region", region.clone()));
        }
        if let Some(key) = &self.api_key {
            params.push(("key", key.clone()));
        }
        params
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse> {
        log::debug!("Geocoding `{}` via {}", request.address, self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(request))
            .send()
            .await
            .map_err(MapError::from)?
            .error_for_status()
            .map_err(MapError::from)?;

        let body = response.text().await.map_err(MapError::from)?;
        parse_answer(&body)
    }
}

/// Decodes a geocoder reply. A body that is not a geocoder answer is a
/// geocoding failure rather than a miss.
fn parse_answer(body: &str) -> Result<GeocodeResponse> {
    let answer: GeocodeResponse = serde_json::from_str(body)
        .map_err(|e| MapError::Geocoding(format!("unreadable geocoder answer: {}", e)))?;

    if let Some(message) = &answer.error_message {
        log::warn!("Geocoder answered {}: {}", answer.status, message);
    }

    Ok(answer)
}
