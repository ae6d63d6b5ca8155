use axum::routing::{get, post};
use axum::Router;

pub mod create;
pub mod fetch;

pub use create::{CreateSecretRequest, CreateSecretResponse};
pub use fetch::{FetchSecretRequest, FetchSecretResponse};

use crate::ServiceState;

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/secret", post(create::handler))
        .route("/secret/:secret_id", get(fetch::handler))
        .with_state(state)
}
