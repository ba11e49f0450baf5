//! Core library for `weatherbox`.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the weather and geocoding providers
//! - Shared domain models (coordinates, units, readings)
//! - Client-side state: map view, coordinate holder, weather query and panel
//!
//! It is used by `weatherbox-proxy` and `weatherbox-cli`.

pub mod client;
pub mod config;
pub mod coordinate;
pub mod display;
pub mod map;
pub mod model;
pub mod provider;
pub mod query;

pub use client::BackendClient;
pub use config::{Config, ProviderConfig};
pub use coordinate::CoordinateHolder;
pub use display::{Rendered, WeatherPanel};
pub use map::MapView;
pub use model::{CombinedReport, Coordinate, RawReading, Units, WeatherReading};
pub use provider::{GeocodingProvider, ProviderError, ProviderId, WeatherProvider};
pub use query::{QueryClient, QueryStatus, WeatherFetcher, WeatherQuery};
