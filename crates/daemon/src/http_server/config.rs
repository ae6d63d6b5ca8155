use std::net::SocketAddr;

use http::HeaderValue;
use url::Url;

#[derive(Debug, Clone)]
pub struct Config {
    // Listen address
    pub listen_addr: SocketAddr,
    // log level for http tracing
    pub log_level: tracing::Level,
    // Frontend allowed to call the API from a browser
    pub frontend_url: Option<Url>,
}

impl Config {
    pub fn new(listen_addr: SocketAddr, frontend_url: Option<Url>) -> Self {
        tracing::info!(
            "Creating HTTP server Config: listen_addr={}, frontend_url={:?}",
            listen_addr,
            frontend_url.as_ref().map(Url::as_str)
        );
        Self {
            listen_addr,
            log_level: tracing::Level::INFO,
            frontend_url,
        }
    }

    /// The `Origin` value browsers send from the configured frontend
    pub fn allowed_origin(&self) -> Option<HeaderValue> {
        let origin = self.frontend_url.as_ref()?.origin();
        if !origin.is_tuple() {
            return None;
        }
        HeaderValue::from_str(&origin.ascii_serialization()).ok()
    }
}
