use async_trait::async_trait;
use reqwest::{Client, Url};
use tracing::info;

use crate::model::RawReading;

use super::{GeocodingProvider, ProviderError, ProviderId, read_json};

const DEFAULT_BASE_URL: &str = "https://api.mapbox.com";

/// Mapbox reverse geocoding, limited to `place` results.
#[derive(Debug, Clone)]
pub struct MapboxGeocoder {
    api_key: String,
    base_url: String,
    http: Client,
}

impl MapboxGeocoder {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    // Coordinates go into a single path segment so a stray '/' cannot reroute the request.
    fn reverse_url(&self, longitude: &str, latitude: &str) -> Result<Url, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::BaseUrl(ProviderId::Mapbox, e.to_string()))?;
        let leaf = format!("{longitude},{latitude}.json");

        url.path_segments_mut()
            .map_err(|()| ProviderError::BaseUrl(ProviderId::Mapbox, self.base_url.clone()))?
            .pop_if_empty()
            .extend(["geocoding", "v5", "mapbox.places", leaf.as_str()]);

        Ok(url)
    }
}

#[async_trait]
impl GeocodingProvider for MapboxGeocoder {
    async fn reverse(&self, longitude: &str, latitude: &str) -> Result<RawReading, ProviderError> {
        let url = self.reverse_url(longitude, latitude)?;

        info!(longitude, latitude, "Calling reverse geocoding api");

        let res = self
            .http
            .get(url)
            .query(&[("types", "place"), ("access_token", self.api_key.as_str())])
            .send()
            .await
            .map_err(|source| ProviderError::Transport { provider: ProviderId::Mapbox, source })?;

        read_json(ProviderId::Mapbox, res).await
    }
}
