use super::{GeocodeRequest, GeocodeResponse, Geocoder, GeocoderStatus};
use crate::Result;
use async_trait::async_trait;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

/// Wraps a geocoder and memoizes its OK answers.
///
/// Misses and errors are never cached, so a transient failure is retried on
/// the next request for the same address.
pub struct CachingGeocoder {
    inner: Arc<dyn Geocoder>,
    cache: Mutex<LruCache<String, GeocodeResponse>>,
}

impl CachingGeocoder {
    pub fn new(inner: Arc<dyn Geocoder>, capacity: NonZeroUsize) -> Self {
        Self {
            inner,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, key: &str) -> Option<GeocodeResponse> {
        let mut cache = self.cache.lock().ok()?;
        cache.get(key).cloned()
    }

    fn store(&self, key: String, response: &GeocodeResponse) {
        if let Ok(mut cache) = self.cache.lock() {
            cache.put(key, response.clone());
        }
    }
}

#[async_trait]
impl Geocoder for CachingGeocoder {
    async fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse> {
        let key = request.cache_key();

        if let Some(hit) = self.lookup(&key) {
            log::debug!("Geocode cache hit for `{}`", key);
            return Ok(hit);
        }

        let response = self.inner.geocode(request).await?;
        if response.effective_status() == GeocoderStatus::Ok {
            self.store(key, &response);
        }
        Ok(response)
    }
}
