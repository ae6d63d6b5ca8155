use clap::Args;
use url::Url;

use common::prelude::{decrypt, Failure, Flow, FlowError};
use onetime_daemon::http_server::api::secret::FetchSecretRequest;

use crate::cli::op::OpContext;

/// Fetch, burn and decrypt a secret. The API is reached through `--remote`;
/// only the id from the link is sent.
#[derive(Args, Debug, Clone)]
pub struct Open {
    /// Share link, `<base>/secret/<id>#<key>`
    pub link: Url,
}

#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("not a share link, expected <base>/secret/<id>#<key>")]
    NotASecretLink,
    #[error("{0}")]
    Failed(Failure),
    #[error(transparent)]
    Flow(#[from] FlowError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Open {
    type Error = OpenError;
    type Output = String;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error> {
        let flow = Flow::enter(self.link.path(), self.link.fragment());
        if let Some(failure) = flow.failure() {
            return Err(OpenError::Failed(failure));
        }
        let (id, key) = flow.retrieval().ok_or(OpenError::NotASecretLink)?;

        let response = match ctx.client.call(FetchSecretRequest::new(id.clone())).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("fetch failed: {}", e);
                let failure = if e.is_not_found() {
                    Failure::NotFound
                } else {
                    Failure::ServerError
                };
                return Err(OpenError::Failed(flow.fail(failure)?.into_failure()?));
            }
        };

        let plaintext = match response.blob().and_then(|blob| decrypt(blob.as_bytes(), key)) {
            Ok(plaintext) => plaintext,
            Err(e) => {
                let failure = Failure::from(&e);
                return Err(OpenError::Failed(flow.fail(failure)?.into_failure()?));
            }
        };

        Ok(flow.reveal(plaintext)?.into_plaintext()?)
    }
}

#[cfg(test)]
mod tests {
    use common::prelude::{build_link, SecretId, ShareKey};

    use super::*;
    use crate::cli::op::Op;

    // Nothing listens on the discard port
    fn offline_ctx() -> OpContext {
        OpContext::new(Url::parse("http://127.0.0.1:9").unwrap(), None).unwrap()
    }

    #[tokio::test]
    async fn test_unreachable_server_fails_the_flow() {
        let key = ShareKey::generate().unwrap();
        let link = build_link(
            &Url::parse("https://host").unwrap(),
            &SecretId::generate(),
            &key,
        )
        .unwrap();

        let err = Open { link }.execute(&offline_ctx()).await.unwrap_err();
        assert!(matches!(err, OpenError::Failed(Failure::ServerError)));
    }

    #[tokio::test]
    async fn test_bad_key_fails_before_fetching() {
        let link = Url::parse("https://host/secret/abc#AAAA").unwrap();

        let err = Open { link }.execute(&offline_ctx()).await.unwrap_err();
        assert!(matches!(err, OpenError::Failed(Failure::DecryptionFailed)));
    }

    #[tokio::test]
    async fn test_non_secret_link_is_rejected() {
        let link = Url::parse("https://host/other#AAAA").unwrap();

        let err = Open { link }.execute(&offline_ctx()).await.unwrap_err();
        assert!(matches!(err, OpenError::NotASecretLink));
    }
}
