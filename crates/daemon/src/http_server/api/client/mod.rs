//! Typed HTTP client for the API.
//!
//! Each operation's request type implements [`ApiRequest`] next to its server
//! handler, so the wire shape lives in one place.

mod client;
mod error;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;

pub use client::ApiClient;
pub use error::ApiError;

pub trait ApiRequest {
    type Response: DeserializeOwned;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError>;
}

/// Append path segments to the API base url, keeping any path prefix it has.
pub(crate) fn api_url<'a>(
    base_url: &Url,
    segments: impl IntoIterator<Item = &'a str>,
) -> Result<Url, ApiError> {
    let mut url = base_url.clone();
    url.set_query(None);
    url.set_fragment(None);
    url.path_segments_mut()
        .map_err(|_| ApiError::InvalidRemote(base_url.to_string()))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
