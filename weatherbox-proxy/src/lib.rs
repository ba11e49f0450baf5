//! Stateless passthrough endpoints in front of the weather and geocoding
//! providers.
//!
//! Each handler checks that its required query parameters are present,
//! forwards them to the provider and returns the provider's JSON as is.

pub mod error;
pub mod handlers;
pub mod server;
pub mod state;

pub use error::ProxyError;
pub use server::{router, serve_on, start_server};
pub use state::AppState;
