//! Manually triggered weather query with a keyed result cache.
//!
//! The query never runs on its own; a fetch happens only on [`WeatherQuery::refetch`].
//! Results live in a [`QueryClient`] under a constant key, so whatever was
//! fetched last stays visible until someone clears it or fetches again.

use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::model::{Units, WeatherReading};

/// Cache key shared by every weather fetch, independent of coordinate and units.
pub const WEATHER_QUERY_KEY: &str = "weather";

/// Anything that can answer a realtime weather request for the client.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch_realtime(&self, location: &str, units: Units) -> anyhow::Result<WeatherReading>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryStatus {
    /// Nothing has been stored under the key yet.
    #[default]
    Pending,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryState {
    pub status: QueryStatus,
    pub data: Option<WeatherReading>,
    pub error: Option<String>,
    pub is_fetching: bool,
}

/// Result store keyed by query key.
#[derive(Debug, Default)]
pub struct QueryClient {
    entries: HashMap<String, QueryState>,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self, key: &str) -> QueryState {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    pub fn query_data(&self, key: &str) -> Option<&WeatherReading> {
        self.entries.get(key).and_then(|s| s.data.as_ref())
    }

    /// Overwrite the cached data. `None` clears it; the entry then reads as a
    /// successful query with no data, and any previous error is dropped.
    pub fn set_query_data(&mut self, key: &str, data: Option<WeatherReading>) {
        let entry = self.entries.entry(key.to_string()).or_default();
        entry.status = QueryStatus::Success;
        entry.data = data;
        entry.error = None;
    }

    fn set_fetching(&mut self, key: &str, fetching: bool) {
        self.entries.entry(key.to_string()).or_default().is_fetching = fetching;
    }

    // Previous data is kept, matching how a failed refetch leaves the cache.
    fn set_error(&mut self, key: &str, message: String) {
        let entry = self.entries.entry(key.to_string()).or_default();
        entry.status = QueryStatus::Error;
        entry.error = Some(message);
    }
}

/// A disabled-by-default query bound to one cache key.
#[derive(Debug, Clone)]
pub struct WeatherQuery {
    key: &'static str,
}

impl WeatherQuery {
    pub fn new() -> Self {
        Self { key: WEATHER_QUERY_KEY }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Issue exactly one request and record the outcome. No retry.
    pub async fn refetch(
        &self,
        client: &mut QueryClient,
        fetcher: &dyn WeatherFetcher,
        location: &str,
        units: Units,
    ) -> QueryStatus {
        client.set_fetching(self.key, true);
        info!(location, %units, "fetching realtime weather");

        match fetcher.fetch_realtime(location, units).await {
            Ok(reading) => client.set_query_data(self.key, Some(reading)),
            Err(err) => {
                warn!("weather fetch failed: {err:#}");
                client.set_error(self.key, format!("{err:#}"));
            }
        }

        client.set_fetching(self.key, false);
        client.state(self.key).status
    }
}

impl Default for WeatherQuery {
    fn default() -> Self {
        Self::new()
    }
}
