use clap::Args;

use onetime_daemon::state::{AppState, StorageBackend};

#[derive(Args, Debug, Clone)]
pub struct Health;

#[derive(Debug, thiserror::Error)]
pub enum HealthError {
    #[error("Health check failed: {0}")]
    Failed(String),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Health {
    type Error = HealthError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut lines = Vec::new();

        // 1. Check config directory
        lines.push("Config:".to_string());
        match AppState::load(ctx.config_path.clone()) {
            Ok(state) => {
                lines.push(format!("  directory:    {}", state.onetime_dir.display()));
                lines.push("  config.toml:  OK".to_string());
                lines.push(format!("  listen:       {}", state.config.api_listen_addr));
                lines.push(format!(
                    "  frontend:     {}",
                    state.config.frontend_url.as_deref().unwrap_or("(none)")
                ));
                match state.config.storage {
                    StorageBackend::Memory => lines.push("  storage:      memory".to_string()),
                    StorageBackend::Sqlite => lines.push(format!(
                        "  storage:      sqlite ({})",
                        if state.db_path.exists() {
                            "OK"
                        } else {
                            "not created yet"
                        }
                    )),
                }
            }
            Err(e) => {
                lines.push(format!("  error: {}", e));
            }
        }

        // 2. Check daemon liveness and readiness
        let base = ctx.client.base_url();
        let client = ctx.client.http_client();

        lines.push(String::new());
        lines.push(format!("Daemon ({}):", base));

        for endpoint in ["livez", "readyz"] {
            let url = format!(
                "{}/_status/{}",
                base.as_str().trim_end_matches('/'),
                endpoint
            );
            let status = match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => "OK".to_string(),
                Ok(resp) => format!("UNHEALTHY ({})", resp.status()),
                Err(_) => "NOT REACHABLE".to_string(),
            };
            lines.push(format!("  {:<7} {}", format!("{}:", endpoint), status));
        }

        Ok(lines.join("\n"))
    }
}
