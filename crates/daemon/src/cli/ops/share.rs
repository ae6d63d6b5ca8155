use clap::Args;
use tokio::io::AsyncReadExt;
use url::Url;

use common::prelude::{build_link, encrypt, Failure, Flow, FlowError, LinkError};
use onetime_daemon::http_server::api::secret::CreateSecretRequest;
use onetime_daemon::state::AppState;

use crate::cli::op::OpContext;

#[derive(Args, Debug, Clone)]
pub struct Share {
    /// Secret to share; read from stdin when omitted
    #[arg(long)]
    pub text: Option<String>,

    /// Base url of the issued link (defaults to the configured frontend, then the remote)
    #[arg(long)]
    pub link_base: Option<Url>,
}

#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    #[error("nothing to share")]
    EmptySecret,
    #[error("failed to read secret from stdin: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Failed(Failure),
    #[error("invalid link base: {0}")]
    Link(#[from] LinkError),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

impl Share {
    async fn read_secret(&self) -> Result<String, ShareError> {
        let text = match &self.text {
            Some(text) => text.clone(),
            None => {
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await?;
                text.trim_end_matches(['\n', '\r']).to_string()
            }
        };

        if text.is_empty() {
            return Err(ShareError::EmptySecret);
        }
        Ok(text)
    }

    fn link_base(&self, ctx: &OpContext) -> Url {
        if let Some(base) = &self.link_base {
            return base.clone();
        }
        AppState::load(ctx.config_path.clone())
            .ok()
            .and_then(|state| state.config.frontend_url().ok().flatten())
            .unwrap_or_else(|| ctx.client.base_url().clone())
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Share {
    type Error = ShareError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let text = self.read_secret().await?;
        let flow = Flow::Composing.submit()?;

        let (blob, key) = match encrypt(&text) {
            Ok(sealed) => sealed,
            Err(e) => {
                let failure = Failure::from(&e);
                return Err(ShareError::Failed(flow.fail(failure)?.into_failure()?));
            }
        };
        drop(text);

        let response = match ctx.client.call(CreateSecretRequest::new(&blob)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("create failed: {}", e);
                let failed = flow.fail(Failure::ServerError)?;
                return Err(ShareError::Failed(failed.into_failure()?));
            }
        };

        let link = build_link(&self.link_base(ctx), &response.secret_id, &key)?;
        let output = link.to_string();
        flow.link_ready(link)?;

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::op::Op;

    fn offline_ctx() -> OpContext {
        OpContext::new(Url::parse("http://127.0.0.1:9").unwrap(), None).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_the_flow() {
        let share = Share {
            text: Some("hunter2".to_string()),
            link_base: None,
        };

        let err = share.execute(&offline_ctx()).await.unwrap_err();
        assert!(matches!(err, ShareError::Failed(Failure::ServerError)));
    }

    #[tokio::test]
    async fn test_empty_secret_is_refused() {
        let share = Share {
            text: Some(String::new()),
            link_base: None,
        };

        let err = share.execute(&offline_ctx()).await.unwrap_err();
        assert!(matches!(err, ShareError::EmptySecret));
    }
}
