//! HTTP request handlers for the passthrough endpoints.

use axum::{
    Json,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
};
use std::{collections::HashMap, sync::Arc};
use tracing::{info, instrument};
use weatherbox_core::{CombinedReport, RawReading};

use crate::{
    error::{ProxyError, require},
    state::AppState,
};

/// Query parameters by name. A repeated parameter keeps its last value.
type Params = HashMap<String, String>;

/// `GET /realtimeWeather?location=..&units=..`
#[instrument(skip(state))]
pub async fn realtime_weather_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<RawReading>, ProxyError> {
    let location = require(&params, "location")?;
    let units = require(&params, "units")?;

    info!("Calling realtimeWeather api");
    let reading = state.weather.realtime(location, units).await?;
    Ok(Json(reading))
}

/// `GET /reverseGeocoding?longitude=..&latitude=..`
#[instrument(skip(state))]
pub async fn reverse_geocoding_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<RawReading>, ProxyError> {
    let longitude = require(&params, "longitude")?;
    let latitude = require(&params, "latitude")?;

    info!("Calling reverseGeocoding api");
    let place = state.geocoder.reverse(longitude, latitude).await?;
    Ok(Json(place))
}

/// `GET /weatherBasedCoordinates?longitude=..&latitude=..&units=..`
///
/// Geocoding runs first, then weather. Either failure fails the request.
#[instrument(skip(state))]
pub async fn weather_based_coordinates_handler(
    Extension(state): Extension<Arc<AppState>>,
    Query(params): Query<Params>,
) -> Result<Json<CombinedReport<RawReading>>, ProxyError> {
    let longitude = require(&params, "longitude")?;
    let latitude = require(&params, "latitude")?;
    let units = require(&params, "units")?;

    info!("Calling weatherBasedCoordinates api");
    let location = state.geocoder.reverse(longitude, latitude).await?;
    let weather = state
        .weather
        .realtime(&format!("{latitude},{longitude}"), units)
        .await?;

    Ok(Json(CombinedReport { location, weather }))
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
