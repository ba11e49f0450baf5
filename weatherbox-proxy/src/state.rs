use std::sync::Arc;

use weatherbox_core::{
    Config, GeocodingProvider, WeatherProvider,
    provider::{geocoding_provider_from_config, weather_provider_from_config},
};

/// Immutable provider clients shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub weather: Arc<dyn WeatherProvider>,
    pub geocoder: Arc<dyn GeocodingProvider>,
}

impl AppState {
    pub fn new(weather: Arc<dyn WeatherProvider>, geocoder: Arc<dyn GeocodingProvider>) -> Self {
        Self { weather, geocoder }
    }

    /// Both provider keys are required before the proxy can start.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(
            weather_provider_from_config(config)?,
            geocoding_provider_from_config(config)?,
        ))
    }
}
