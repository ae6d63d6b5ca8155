use std::net::SocketAddr;
use std::path::PathBuf;

use url::Url;

use crate::state::StorageBackend;

#[derive(Debug, Clone)]
pub struct Config {
    // http server configuration
    /// Address for the API server to listen on
    pub api_listen_addr: SocketAddr,
    /// Frontend origin allowed to call the API cross-origin.
    ///  If not set, no cross-origin access is granted
    pub frontend_url: Option<Url>,

    // data store configuration
    pub storage: StorageBackend,
    /// a path to a sqlite database, if not set then an
    ///  in-memory database will be used by the sqlite backend
    pub sqlite_path: Option<PathBuf>,

    // logging
    pub log_level: tracing::Level,
    /// Directory for log files (optional, logs to stdout only if not set)
    pub log_dir: Option<PathBuf>,
}
