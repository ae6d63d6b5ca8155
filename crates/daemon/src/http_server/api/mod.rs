use axum::Router;
use http::header::{ACCEPT, CONTENT_TYPE, ORIGIN};
use http::{HeaderValue, Method};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub mod client;
pub mod secret;

use crate::ServiceState;

/// Body of every API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API routes. Cross-origin calls are only allowed from `allowed_origin`;
/// without one, browsers on other origins are refused.
pub fn router(state: ServiceState, allowed_origin: Option<HeaderValue>) -> Router<ServiceState> {
    let cors_layer = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::POST])
        .allow_headers(vec![ACCEPT, CONTENT_TYPE, ORIGIN])
        .allow_credentials(false);
    let cors_layer = match allowed_origin {
        Some(origin) => cors_layer.allow_origin(AllowOrigin::list([origin])),
        None => cors_layer,
    };

    Router::new()
        .merge(secret::router(state.clone()))
        .with_state(state)
        .layer(cors_layer)
}
