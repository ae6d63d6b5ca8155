use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::prelude::{SealedBlob, SecretId};

use crate::http_server::api::client::{api_url, ApiError, ApiRequest};
use crate::http_server::api::ErrorResponse;
use crate::store::StoreError;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretRequest {
    /// Standard base64 of `nonce || ciphertext || tag`
    pub encrypted_data: String,
}

impl CreateSecretRequest {
    pub fn new(blob: &SealedBlob) -> Self {
        Self {
            encrypted_data: blob.to_base64(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSecretResponse {
    pub secret_id: SecretId,
}

pub async fn handler(
    State(state): State<ServiceState>,
    payload: Result<Json<CreateSecretRequest>, JsonRejection>,
) -> Result<impl IntoResponse, CreateError> {
    let Json(req) = payload?;

    let blob = SealedBlob::from_base64(&req.encrypted_data)
        .map_err(|_| CreateError::InvalidCiphertext)?;
    let size = blob.len();

    let secret_id = state.store().create(blob.into_bytes()).await?;
    tracing::info!(size, "CREATE SECRET: stored sealed secret");
    tracing::debug!(%secret_id, "CREATE SECRET: assigned id");

    Ok((StatusCode::CREATED, Json(CreateSecretResponse { secret_id })))
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error("encrypted_data is required")]
    MissingData,
    #[error("request body is too large")]
    TooLarge,
    #[error("encrypted_data is not a valid ciphertext")]
    InvalidCiphertext,
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl From<JsonRejection> for CreateError {
    fn from(rejection: JsonRejection) -> Self {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            CreateError::TooLarge
        } else {
            CreateError::MissingData
        }
    }
}

impl IntoResponse for CreateError {
    fn into_response(self) -> Response {
        let status = match self {
            CreateError::MissingData | CreateError::InvalidCiphertext => StatusCode::BAD_REQUEST,
            CreateError::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            CreateError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        };

        let message = match self {
            CreateError::Store(e) => {
                tracing::error!("CREATE SECRET ERROR: {}", e);
                "storage unavailable, please retry".to_string()
            }
            other => {
                tracing::warn!("CREATE SECRET ERROR: {}", other);
                other.to_string()
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for CreateSecretRequest {
    type Response = CreateSecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = api_url(base_url, ["api", "secret"])?;
        Ok(client.post(full_url).json(&self))
    }
}
