use axum::extract::{Json, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use url::Url;

use common::crypto::encode_blob;
use common::prelude::{CryptoError, SealedBlob, SecretId};

use crate::http_server::api::client::{api_url, ApiError, ApiRequest};
use crate::http_server::api::ErrorResponse;
use crate::store::StoreError;
use crate::ServiceState;

/// Fetch and burn a secret. Only the id travels; the key stays with the
/// caller.
#[derive(Debug, Clone)]
pub struct FetchSecretRequest {
    pub secret_id: SecretId,
}

impl FetchSecretRequest {
    pub fn new(secret_id: SecretId) -> Self {
        Self { secret_id }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchSecretResponse {
    pub encrypted_data: String,
}

impl FetchSecretResponse {
    pub fn blob(&self) -> Result<SealedBlob, CryptoError> {
        SealedBlob::from_base64(&self.encrypted_data)
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(secret_id): Path<String>,
) -> Result<impl IntoResponse, FetchError> {
    // An id we could never have issued cannot exist
    let secret_id: SecretId = secret_id.parse().map_err(|_| FetchError::NotFound)?;

    let blob = state.store().take_once(&secret_id).await?;
    tracing::info!(size = blob.len(), "FETCH SECRET: delivered and deleted");

    Ok((
        StatusCode::OK,
        Json(FetchSecretResponse {
            encrypted_data: encode_blob(&blob),
        }),
    ))
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Secret not found. It may have been viewed already.")]
    NotFound,
    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for FetchError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => FetchError::NotFound,
            StoreError::Unavailable(detail) => FetchError::Store(detail),
        }
    }
}

impl IntoResponse for FetchError {
    fn into_response(self) -> Response {
        match self {
            FetchError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new(self.to_string())),
            )
                .into_response(),
            FetchError::Store(ref detail) => {
                tracing::error!("FETCH SECRET ERROR: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(ErrorResponse::new("storage unavailable, please retry")),
                )
                    .into_response()
            }
        }
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for FetchSecretRequest {
    type Response = FetchSecretResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = api_url(base_url, ["api", "secret", self.secret_id.as_str()])?;
        Ok(client.get(full_url))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use common::prelude::{encrypt, ShareLink};

    use super::*;
    use crate::store::{MemoryStore, SecretStore};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_burns_secret() {
        let store = Arc::new(MemoryStore::new());
        let state = ServiceState::new(store.clone());
        let (blob, _) = encrypt("launch code 42").unwrap();
        let id = store.create(blob.as_bytes().to_vec()).await.unwrap();

        let response = handler(State(state.clone()), Path(id.to_string()))
            .await
            .unwrap()
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["encrypted_data"], blob.to_base64());

        let response = match handler(State(state), Path(id.to_string())).await {
            Ok(_) => panic!("secret was served twice"),
            Err(e) => e.into_response(),
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["error"],
            "Secret not found. It may have been viewed already."
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let state = ServiceState::new(Arc::new(MemoryStore::new()));
        let response = match handler(State(state), Path("has space".to_string())).await {
            Ok(_) => panic!("malformed id was served"),
            Err(e) => e.into_response(),
        };
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_key_is_never_transmitted() {
        let (_, key) = encrypt("launch code 42").unwrap();
        let id = SecretId::generate();
        let link = ShareLink::new(Url::parse("https://app.example.com").unwrap(), id, key)
            .to_url()
            .unwrap();
        let encoded = link.fragment().unwrap().to_string();

        // Even a remote given as the full share link loses its fragment
        let parsed = ShareLink::parse(&link).unwrap();
        for remote in [Url::parse("https://api.example.com").unwrap(), link.clone()] {
            let request = FetchSecretRequest::new(parsed.id.clone())
                .build_request(&remote, &Client::new())
                .unwrap()
                .build()
                .unwrap();

            assert_eq!(request.method(), reqwest::Method::GET);
            assert!(request.url().fragment().is_none());
            assert!(request.url().query().is_none());
            assert!(!request.url().as_str().contains(&encoded));
            assert!(request.body().is_none());
            assert!(request
                .url()
                .path()
                .ends_with(&format!("/api/secret/{}", parsed.id)));
        }
    }
}
