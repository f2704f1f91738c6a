//! Session builder for fluent configuration
//!
//! Any backend left unset falls back to the hosted service named in the
//! session configuration.

use crate::{
    core::{config::SessionConfig, session::MapSession},
    data::table::{CsvTableSource, HttpTableSource, TableSource},
    geocoding::{cache::CachingGeocoder, http::HttpGeocoder, Geocoder},
    Result,
};
use std::{num::NonZeroUsize, path::PathBuf, sync::Arc};

/// Builder for creating and configuring MapSession instances
#[derive(Default)]
pub struct SessionBuilder {
    config: SessionConfig,
    geocoder: Option<Arc<dyn Geocoder>>,
    table_source: Option<Arc<dyn TableSource>>,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn Geocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn table_source(mut self, source: Arc<dyn TableSource>) -> Self {
        self.table_source = Some(source);
        self
    }

    /// Read overlay rows from a local CSV export instead of the hosted table
    pub fn table_file(self, path: impl Into<PathBuf>) -> Self {
        self.table_source(Arc::new(CsvTableSource::new(path)))
    }

    /// Validate the configuration and assemble the session
    pub fn build(self) -> Result<MapSession> {
        self.config.validate()?;

        let geocoder = match self.geocoder {
            Some(geocoder) => geocoder,
            None => default_geocoder(&self.config)?,
        };
        let table_source: Arc<dyn TableSource> = match self.table_source {
            Some(source) => source,
            None => Arc::new(HttpTableSource::from_config(&self.config.overlay)?),
        };

        Ok(MapSession::new(self.config, geocoder, table_source))
    }
}

fn default_geocoder(config: &SessionConfig) -> Result<Arc<dyn Geocoder>> {
    let http: Arc<dyn Geocoder> = Arc::new(HttpGeocoder::from_config(&config.geocoder)?);

    Ok(match NonZeroUsize::new(config.geocoder.cache_size) {
        Some(capacity) => Arc::new(CachingGeocoder::new(http, capacity)),
        None => http,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::InMemoryTableSource;

    #[test]
    fn test_build_with_defaults() {
        let session = SessionBuilder::new().build().unwrap();

        assert!(!session.is_initialized());
        assert_eq!(session.config().overlay.style_id, 2);
    }

    #[test]
    fn test_build_rejects_invalid_config() {
        let mut config = SessionConfig::default();
        config.map.zoom = 99.0;

        assert!(SessionBuilder::new().config(config).build().is_err());
    }

    #[test]
    fn test_injected_table_source() {
        let mut session = MapSession::builder()
            .table_source(Arc::new(InMemoryTableSource::new(Vec::new())))
            .build()
            .unwrap();

        session.initialize().unwrap();
        assert!(session.is_initialized());
    }
}
