use async_trait::async_trait;
use reqwest::Client;
use tracing::info;

use crate::model::RawReading;

use super::{ProviderError, ProviderId, WeatherProvider, read_json};

const DEFAULT_BASE_URL: &str = "https://api.tomorrow.io";

#[derive(Debug, Clone)]
pub struct TomorrowIoProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl TomorrowIoProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the provider at another host, e.g. a mock server.
    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }
}

#[async_trait]
impl WeatherProvider for TomorrowIoProvider {
    async fn realtime(&self, location: &str, units: &str) -> Result<RawReading, ProviderError> {
        let url = format!("{}/v4/weather/realtime", self.base_url);

        info!(location, units, "Calling realtime weather api");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("location", location),
                ("units", units),
                ("apikey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ProviderError::Transport { provider: ProviderId::TomorrowIo, source })?;

        read_json(ProviderId::TomorrowIo, res).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn realtime_forwards_params_and_returns_body_verbatim() {
        let mock_server = MockServer::start().await;
        let body = r#"{"data":{"time":"2025-06-05T14:30:00Z","values":{"windSpeed":3.10,"temperature":71.6}},"location":{"lon":-74.0,"lat":40.71}}"#;

        Mock::given(method("GET"))
            .and(path("/v4/weather/realtime"))
            .and(query_param("location", "40.71,-74.00"))
            .and(query_param("units", "imperial"))
            .and(query_param("apikey", "KEY"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let provider = TomorrowIoProvider::with_base_url("KEY".into(), &mock_server.uri());
        let reading = provider.realtime("40.71,-74.00", "imperial").await.unwrap();

        assert_eq!(reading.get(), body);
    }

    #[tokio::test]
    async fn realtime_maps_non_success_status_to_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/weather/realtime"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "code": 401001 })))
            .mount(&mock_server)
            .await;

        let provider = TomorrowIoProvider::with_base_url("BAD".into(), &mock_server.uri());
        let err = provider.realtime("0,0", "metric").await.unwrap_err();

        assert!(matches!(err, ProviderError::Status { status: 401, .. }));
    }

    #[tokio::test]
    async fn realtime_maps_malformed_body_to_decode_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v4/weather/realtime"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = TomorrowIoProvider::with_base_url("KEY".into(), &mock_server.uri());
        let err = provider.realtime("0,0", "metric").await.unwrap_err();

        assert!(matches!(err, ProviderError::Decode { .. }));
    }
}
