use std::net::SocketAddr;

use clap::Args;
use url::Url;

use onetime_daemon::state::{AppState, AppStateError, StorageBackend};
use onetime_daemon::spawn_service;

#[derive(Args, Debug, Clone)]
pub struct Daemon {
    /// Override the API listen address (default from config)
    #[arg(long)]
    pub listen_addr: Option<SocketAddr>,

    /// Override the frontend allowed to call the API cross-origin
    #[arg(long)]
    pub frontend_url: Option<Url>,

    /// Override the storage backend
    #[arg(long, value_enum)]
    pub storage: Option<StorageBackend>,

    /// Directory for log files (logs to stdout only if not set)
    #[arg(long)]
    pub log_dir: Option<std::path::PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum DaemonError {
    #[error("state error: {0}")]
    StateError(#[from] AppStateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Daemon {
    type Error = DaemonError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        // Runs with defaults when the config directory was never initialized
        let mut state = AppState::load_or_default(ctx.config_path.clone())?;
        if let Some(storage) = self.storage {
            state.config.storage = storage;
        }

        let mut config = state.to_service_config()?;
        if let Some(addr) = self.listen_addr {
            config.api_listen_addr = addr;
        }
        if let Some(url) = &self.frontend_url {
            config.frontend_url = Some(url.clone());
        }
        config.log_dir = self.log_dir.clone();

        spawn_service(&config).await;
        Ok("daemon ended".to_string())
    }
}
