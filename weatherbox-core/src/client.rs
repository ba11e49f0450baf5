use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::{
    model::{CombinedReport, Coordinate, Units, WeatherReading},
    query::WeatherFetcher,
};

/// HTTP client for the proxy endpoints.
#[derive(Debug, Clone)]
pub struct BackendClient {
    base_url: String,
    http: Client,
}

impl BackendClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn realtime_weather(&self, location: &str, units: Units) -> Result<WeatherReading> {
        self.get("realtimeWeather", &[("location", location), ("units", units.as_str())]).await
    }

    pub async fn reverse_geocoding(&self, coordinate: Coordinate) -> Result<WeatherReading> {
        let longitude = coordinate.longitude.to_string();
        let latitude = coordinate.latitude.to_string();
        self.get("reverseGeocoding", &[("longitude", longitude.as_str()), ("latitude", latitude.as_str())]).await
    }

    pub async fn weather_based_coordinates(
        &self,
        coordinate: Coordinate,
        units: Units,
    ) -> Result<CombinedReport> {
        let longitude = coordinate.longitude.to_string();
        let latitude = coordinate.latitude.to_string();
        self.get(
            "weatherBasedCoordinates",
            &[("longitude", longitude.as_str()), ("latitude", latitude.as_str()), ("units", units.as_str())],
        )
        .await
    }

    async fn get<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{endpoint}", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {endpoint}"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .with_context(|| format!("Failed to read {endpoint} response body"))?;

        if !status.is_success() {
            return Err(anyhow!("{endpoint} failed with status {status}: {body}"));
        }

        serde_json::from_str(&body).with_context(|| format!("Failed to parse {endpoint} JSON"))
    }
}

#[async_trait]
impl WeatherFetcher for BackendClient {
    async fn fetch_realtime(&self, location: &str, units: Units) -> Result<WeatherReading> {
        self.realtime_weather(location, units).await
    }
}
