use crate::{
    Config,
    model::RawReading,
    provider::{mapbox::MapboxGeocoder, tomorrowio::TomorrowIoProvider},
};
use async_trait::async_trait;
use std::{convert::TryFrom, fmt::Debug, sync::Arc};

pub mod mapbox;
pub mod tomorrowio;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    TomorrowIo,
    Mapbox,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::TomorrowIo => "tomorrowio",
            ProviderId::Mapbox => "mapbox",
        }
    }

    /// Environment variable that overrides the configured key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::TomorrowIo => "TOMORROWIO_API_KEY",
            ProviderId::Mapbox => "MAPBOX_API_KEY",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::TomorrowIo, ProviderId::Mapbox]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "tomorrowio" => Ok(ProviderId::TomorrowIo),
            "mapbox" => Ok(ProviderId::Mapbox),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: tomorrowio, mapbox."
            )),
        }
    }
}

/// Failure talking to a third-party provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Request to {provider} failed: {source}")]
    Transport {
        provider: ProviderId,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} responded with status {status}: {body}")]
    Status { provider: ProviderId, status: u16, body: String },
    #[error("Failed to parse {provider} JSON: {source}")]
    Decode {
        provider: ProviderId,
        #[source]
        source: serde_json::Error,
    },
    #[error("Invalid {0} base URL: {1}")]
    BaseUrl(ProviderId, String),
}

/// Realtime weather lookup. Returns the provider's JSON untouched.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn realtime(&self, location: &str, units: &str) -> Result<RawReading, ProviderError>;
}

/// Reverse geocoding restricted to place granularity.
#[async_trait]
pub trait GeocodingProvider: Send + Sync + Debug {
    async fn reverse(&self, longitude: &str, latitude: &str) -> Result<RawReading, ProviderError>;
}

/// Construct the weather provider from config.
pub fn weather_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = required_api_key(config, ProviderId::TomorrowIo)?;
    Ok(Arc::new(TomorrowIoProvider::new(api_key.to_owned())))
}

/// Construct the geocoding provider from config.
pub fn geocoding_provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn GeocodingProvider>> {
    let api_key = required_api_key(config, ProviderId::Mapbox)?;
    Ok(Arc::new(MapboxGeocoder::new(api_key.to_owned())))
}

fn required_api_key(config: &Config, id: ProviderId) -> anyhow::Result<&str> {
    config.provider_api_key(id).ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured for provider '{id}'.\n\
                 Hint: run `weatherbox configure {id}` or set {}.",
            id.env_var()
        )
    })
}

/// Read a provider response, mapping non-2xx and malformed bodies to errors.
///
/// A good body is only checked for JSON syntax; its text is kept as received.
pub(crate) async fn read_json(
    provider: ProviderId,
    res: reqwest::Response,
) -> Result<RawReading, ProviderError> {
    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|source| ProviderError::Transport { provider, source })?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            body: truncate_body(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| ProviderError::Decode { provider, source })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
