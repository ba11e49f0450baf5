// HTTP server startup logic

use anyhow::{Context, Result};
use axum::{
    Extension, Router,
    http::{HeaderValue, header},
    middleware,
    response::Response,
    routing::get,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use weatherbox_core::Config;

use crate::{
    handlers::{
        health_handler, realtime_weather_handler, reverse_geocoding_handler,
        weather_based_coordinates_handler,
    },
    state::AppState,
};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/realtimeWeather", get(realtime_weather_handler))
        .route("/reverseGeocoding", get(reverse_geocoding_handler))
        .route("/weatherBasedCoordinates", get(weather_based_coordinates_handler))
        .route("/health", get(health_handler))
        .layer(middleware::map_response(allow_any_origin))
        .layer(Extension(Arc::new(state)))
}

async fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    response
}

/// Serve on an already bound listener until the future resolves.
pub async fn serve_on<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("HTTP server error")
}

/// Bind the configured address and serve until Ctrl+C.
pub async fn start_server(config: &Config, bind_override: Option<&str>) -> Result<()> {
    let state = AppState::from_config(config)?;
    let addr = bind_override.unwrap_or_else(|| config.bind_address());

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("Proxy listening on {}", listener.local_addr()?);

    serve_on(listener, state, async {
        let _ = tokio::signal::ctrl_c().await;
        info!("Shutting down");
    })
    .await
}
