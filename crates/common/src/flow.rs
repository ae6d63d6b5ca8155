//! Client flow for a single share or open action.
//!
//! ```text
//!              enter(no/partial link)              enter(secret link)
//!                      |                                  |
//!                      v                                  v
//!   +---------> Composing --submit--> Submitting    Retrieving
//!   |                                  |      |       |      |
//!   |                           link_ready   fail   reveal   fail
//!   |                                  v      v       v      v
//!   +--reset--- LinkReady          Failed <---+    Revealed  Failed
//!   +--reset--------------------------+---------------+
//! ```
//!
//! Every state change goes through one of the transition methods, which reject
//! anything not drawn above. Plaintext and links never appear in `Debug`
//! output.

use std::fmt;

use url::Url;

use crate::crypto::{CryptoError, ShareKey};
use crate::link::{parse_link, LinkError};
use crate::secret_id::SecretId;

/// What the user is told when a flow fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Failure {
    #[error("secure random or cipher primitives are unavailable")]
    CryptoUnavailable,
    #[error("failed to decrypt secret")]
    DecryptionFailed,
    #[error("secret not found or already viewed")]
    NotFound,
    #[error("server error, please try again")]
    ServerError,
}

impl From<&CryptoError> for Failure {
    fn from(err: &CryptoError) -> Self {
        match err {
            CryptoError::Unavailable => Failure::CryptoUnavailable,
            _ => Failure::DecryptionFailed,
        }
    }
}

impl From<&LinkError> for Failure {
    fn from(err: &LinkError) -> Self {
        match err {
            LinkError::InvalidBase(_) => Failure::ServerError,
            _ => Failure::DecryptionFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("cannot {event} while {from}")]
    InvalidTransition {
        from: &'static str,
        event: &'static str,
    },
}

#[derive(Clone)]
pub enum Flow {
    /// Waiting for the sender to type a secret
    Composing,
    /// Encrypting and uploading
    Submitting,
    /// Upload done, the share link is ready to hand out
    LinkReady { link: Url },
    /// Fetching and decrypting a secret from a link
    Retrieving { id: SecretId, key: ShareKey },
    /// Plaintext is available to show, exactly once
    Revealed { plaintext: String },
    Failed { failure: Failure },
}

impl Flow {
    /// Entry point for both views.
    ///
    /// A location that is a complete secret link starts retrieval. A location
    /// that is not a secret link, or lacks its key, lands on the compose view.
    /// A link whose key cannot be decoded fails immediately.
    pub fn enter(path: &str, fragment: Option<&str>) -> Self {
        match parse_link(path, fragment) {
            Ok((id, key)) => Flow::Retrieving { id, key },
            Err(e) if e.is_recoverable() => Flow::Composing,
            Err(e) => Flow::Failed {
                failure: Failure::from(&e),
            },
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Flow::Composing => "composing",
            Flow::Submitting => "submitting",
            Flow::LinkReady { .. } => "link ready",
            Flow::Retrieving { .. } => "retrieving",
            Flow::Revealed { .. } => "revealed",
            Flow::Failed { .. } => "failed",
        }
    }

    pub fn submit(self) -> Result<Self, FlowError> {
        match self {
            Flow::Composing => Ok(Flow::Submitting),
            other => Err(other.invalid("submit")),
        }
    }

    pub fn link_ready(self, link: Url) -> Result<Self, FlowError> {
        match self {
            Flow::Submitting => Ok(Flow::LinkReady { link }),
            other => Err(other.invalid("finish submitting")),
        }
    }

    pub fn reveal(self, plaintext: String) -> Result<Self, FlowError> {
        match self {
            Flow::Retrieving { .. } => Ok(Flow::Revealed { plaintext }),
            other => Err(other.invalid("reveal")),
        }
    }

    /// Only in-flight states can fail.
    pub fn fail(self, failure: Failure) -> Result<Self, FlowError> {
        match self {
            Flow::Submitting | Flow::Retrieving { .. } => Ok(Flow::Failed { failure }),
            other => Err(other.invalid("fail")),
        }
    }

    /// Back to a blank compose view
    pub fn reset(self) -> Result<Self, FlowError> {
        match self {
            Flow::LinkReady { .. } | Flow::Revealed { .. } | Flow::Failed { .. } => {
                Ok(Flow::Composing)
            }
            other => Err(other.invalid("reset")),
        }
    }

    /// The id and key to retrieve, while retrieving
    pub fn retrieval(&self) -> Option<(&SecretId, &ShareKey)> {
        match self {
            Flow::Retrieving { id, key } => Some((id, key)),
            _ => None,
        }
    }

    /// Consume a revealed flow, handing the plaintext to the caller
    pub fn into_plaintext(self) -> Result<String, FlowError> {
        match self {
            Flow::Revealed { plaintext } => Ok(plaintext),
            other => Err(other.invalid("take the plaintext")),
        }
    }

    /// Consume a failed flow, handing its failure to the caller
    pub fn into_failure(self) -> Result<Failure, FlowError> {
        match self {
            Flow::Failed { failure } => Ok(failure),
            other => Err(other.invalid("report a failure")),
        }
    }

    pub fn failure(&self) -> Option<Failure> {
        match self {
            Flow::Failed { failure } => Some(*failure),
            _ => None,
        }
    }

    fn invalid(&self, event: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            from: self.name(),
            event,
        }
    }
}

impl fmt::Debug for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flow::Retrieving { id, .. } => f.debug_struct("Retrieving").field("id", id).finish(),
            Flow::Failed { failure } => f
                .debug_struct("Failed")
                .field("failure", failure)
                .finish(),
            other => f.write_str(other.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::build_link;

    fn secret_link() -> (Url, SecretId, ShareKey) {
        let id = SecretId::generate();
        let key = ShareKey::generate().unwrap();
        let link = build_link(&Url::parse("https://host").unwrap(), &id, &key).unwrap();
        (link, id, key)
    }

    #[test]
    fn test_sender_happy_path() {
        let (link, _, _) = secret_link();

        let flow = Flow::enter("/", None);
        assert!(matches!(flow, Flow::Composing));

        let flow = flow.submit().unwrap();
        assert!(matches!(flow, Flow::Submitting));

        let flow = flow.link_ready(link.clone()).unwrap();
        match &flow {
            Flow::LinkReady { link: ready } => assert_eq!(ready, &link),
            other => panic!("unexpected state {:?}", other),
        }

        assert!(matches!(flow.reset().unwrap(), Flow::Composing));
    }

    #[test]
    fn test_recipient_happy_path() {
        let (link, id, key) = secret_link();

        let flow = Flow::enter(link.path(), link.fragment());
        let (got_id, got_key) = flow.retrieval().unwrap();
        assert_eq!(got_id, &id);
        assert_eq!(got_key, &key);

        let flow = flow.reveal("launch code 42".to_string()).unwrap();
        assert_eq!(flow.into_plaintext().unwrap(), "launch code 42");
    }

    #[test]
    fn test_incomplete_links_route_to_compose() {
        assert!(matches!(Flow::enter("/about", None), Flow::Composing));
        assert!(matches!(Flow::enter("/secret/abc", None), Flow::Composing));
        assert!(matches!(Flow::enter("/secret/abc", Some("")), Flow::Composing));
    }

    #[test]
    fn test_undecodable_key_fails() {
        let flow = Flow::enter("/secret/abc", Some("AAAA"));
        assert_eq!(flow.failure(), Some(Failure::DecryptionFailed));
    }

    #[test]
    fn test_invalid_transitions() {
        let err = Flow::Composing.reveal("x".to_string()).unwrap_err();
        assert_eq!(
            err,
            FlowError::InvalidTransition {
                from: "composing",
                event: "reveal"
            }
        );

        assert!(Flow::Composing.fail(Failure::NotFound).is_err());
        assert!(Flow::Submitting.reset().is_err());
        assert!(Flow::Submitting.submit().is_err());
        assert!(Flow::Composing.into_plaintext().is_err());

        let failed = Flow::Submitting.fail(Failure::ServerError).unwrap();
        assert!(failed.clone().submit().is_err());
        assert!(matches!(failed.reset().unwrap(), Flow::Composing));
    }

    #[test]
    fn test_failed_flow_reports_its_failure() {
        let (link, _, _) = secret_link();
        let flow = Flow::enter(link.path(), link.fragment());
        let failure = flow.fail(Failure::NotFound).unwrap().into_failure().unwrap();
        assert_eq!(failure, Failure::NotFound);

        assert!(Flow::Composing.into_failure().is_err());
        assert!(Flow::Submitting.into_failure().is_err());
    }

    #[test]
    fn test_failure_messages() {
        assert_eq!(
            Failure::NotFound.to_string(),
            "secret not found or already viewed"
        );
        assert_eq!(
            Failure::from(&CryptoError::AuthenticationFailed),
            Failure::DecryptionFailed
        );
        assert_eq!(
            Failure::from(&CryptoError::MalformedBlob),
            Failure::DecryptionFailed
        );
        assert_eq!(
            Failure::from(&CryptoError::Unavailable),
            Failure::CryptoUnavailable
        );
    }

    #[test]
    fn test_debug_hides_secrets() {
        let (link, _, key) = secret_link();
        let encoded = key.to_base64url();

        let ready = Flow::Submitting.link_ready(link).unwrap();
        assert!(!format!("{:?}", ready).contains(&encoded));

        let revealed = Flow::Retrieving {
            id: SecretId::generate(),
            key,
        }
        .reveal("hunter2".to_string())
        .unwrap();
        assert!(!format!("{:?}", revealed).contains("hunter2"));
    }
}
