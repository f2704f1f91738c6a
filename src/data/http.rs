use crate::core::constants::DEFAULT_HTTP_TIMEOUT_SECS;
use crate::{MapError, Result};
use once_cell::sync::Lazy;
use std::time::Duration;

/// Shared async HTTP client for table and geocoding requests
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    build_client(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS)).unwrap_or_else(|e| {
        log::warn!("Falling back to default HTTP client: {}", e);
        reqwest::Client::new()
    })
});

/// Builds a client with the crate's user agent and the given timeout
pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("stationmap/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .tcp_keepalive(Duration::from_secs(30))
        .pool_idle_timeout(Duration::from_secs(90))
        .build()
        .map_err(MapError::from)?;
    Ok(client)
}

/// Returns the shared client for the default timeout, or a dedicated one otherwise
pub(crate) fn client_for_timeout(timeout: Duration) -> Result<reqwest::Client> {
    if timeout == Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS) {
        Ok(HTTP_CLIENT.clone())
    } else {
        build_client(timeout)
    }
}
