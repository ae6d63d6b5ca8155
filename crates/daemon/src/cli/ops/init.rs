use clap::Args;

use onetime_daemon::state::{AppConfig, AppState, AppStateError, StorageBackend};

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Address the API server listens on
    #[arg(long, default_value = onetime_daemon::state::DEFAULT_API_LISTEN_ADDR)]
    pub api_listen_addr: String,

    /// Frontend allowed to call the API cross-origin; also the base of share links
    #[arg(long)]
    pub frontend_url: Option<String>,

    /// Where the daemon keeps secrets
    #[arg(long, value_enum, default_value_t = StorageBackend::Memory)]
    pub storage: StorageBackend,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("state error: {0}")]
    StateError(#[from] AppStateError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = AppConfig {
            api_listen_addr: self.api_listen_addr.clone(),
            frontend_url: self.frontend_url.clone(),
            storage: self.storage,
        };

        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Initialized onetime directory at {}\n  config:  {}\n  storage: {:?}",
            state.onetime_dir.display(),
            state.config_path.display(),
            state.config.storage,
        ))
    }
}
