use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::collections::HashMap;
use tracing::error;
use weatherbox_core::ProviderError;

/// Everything a handler can fail with.
///
/// Only a missing parameter is reported to the caller. Every other failure
/// becomes the same opaque 500 body; the cause goes to the log.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("Missing required query parameter: '{0}'")]
    MissingParameter(&'static str),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        match self {
            ProxyError::MissingParameter(_) => (StatusCode::BAD_REQUEST, self.to_string()).into_response(),
            ProxyError::Provider(err) => {
                error!("Unexpected error while calling provider: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "error": "Internal Server Error" })),
                )
                    .into_response()
            }
        }
    }
}

/// Absent and empty parameters are both treated as missing.
pub fn require<'a>(
    params: &'a HashMap<String, String>,
    name: &'static str,
) -> Result<&'a str, ProxyError> {
    params
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(ProxyError::MissingParameter(name))
}
