//! One-time share links
//!
//! A share link looks like `<base>/secret/<id>#<key>`:
//!
//! - `<id>` is in the path. It is sent to the server when the recipient
//!   fetches the secret.
//! - `<key>` is the URL-safe base64 [`ShareKey`] and lives only in the
//!   fragment. User agents do not transmit fragments, which is what keeps the
//!   key away from the server.
//!
//! That last property is a convention of user agents, not a cryptographic
//! guarantee. Browser history, clipboard managers or a proxy that logs full
//! URLs can still observe the key; anyone holding the complete link can open
//! the secret once.

use url::Url;

use crate::crypto::ShareKey;
use crate::secret_id::SecretId;

/// Path segment that precedes the id in a share link
pub const SECRET_PATH_SEGMENT: &str = "secret";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// The path is not `/secret/<id>`; callers show the compose view.
    #[error("not a secret link")]
    NotASecretLink,
    /// The path matched but there is no fragment to decrypt with.
    #[error("secret link is missing its key")]
    MissingKey,
    #[error("secret link carries an invalid key")]
    InvalidKey,
    #[error("base url cannot carry a path: {0}")]
    InvalidBase(String),
}

impl LinkError {
    /// Errors that should send the user to the compose view rather than an
    /// error screen
    pub fn is_recoverable(&self) -> bool {
        matches!(self, LinkError::NotASecretLink | LinkError::MissingKey)
    }
}

/// Compose `<base_url>/secret/<id>#<key>`.
///
/// Any path on `base_url` is kept as a prefix; its query and fragment are
/// dropped.
pub fn build_link(base_url: &Url, id: &SecretId, key: &ShareKey) -> Result<Url, LinkError> {
    let mut link = base_url.clone();
    link.set_query(None);
    link.set_fragment(None);
    link.path_segments_mut()
        .map_err(|_| LinkError::InvalidBase(base_url.to_string()))?
        .pop_if_empty()
        .push(SECRET_PATH_SEGMENT)
        .push(id.as_str());
    link.set_fragment(Some(&key.to_base64url()));
    Ok(link)
}

/// Split the current location into the id to fetch and the key to decrypt
/// with.
///
/// `fragment` is the part after `#`, with or without the leading `#`.
pub fn parse_link(path: &str, fragment: Option<&str>) -> Result<(SecretId, ShareKey), LinkError> {
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let id = segments
        .next()
        .filter(|s| !s.is_empty())
        .ok_or(LinkError::NotASecretLink)?;
    if segments.next() != Some(SECRET_PATH_SEGMENT) {
        return Err(LinkError::NotASecretLink);
    }
    let id: SecretId = id.parse().map_err(|_| LinkError::NotASecretLink)?;

    let fragment = fragment
        .map(|f| f.trim_start_matches('#'))
        .filter(|f| !f.is_empty())
        .ok_or(LinkError::MissingKey)?;
    let key = ShareKey::from_base64url(fragment).map_err(|_| LinkError::InvalidKey)?;

    Ok((id, key))
}

/// A parsed share link
#[derive(Debug, Clone)]
pub struct ShareLink {
    /// Origin (and optional path prefix) the link was issued under
    pub base_url: Url,
    pub id: SecretId,
    pub key: ShareKey,
}

impl ShareLink {
    pub fn new(base_url: Url, id: SecretId, key: ShareKey) -> Self {
        Self { base_url, id, key }
    }

    pub fn to_url(&self) -> Result<Url, LinkError> {
        build_link(&self.base_url, &self.id, &self.key)
    }

    /// Parse a full share link
    pub fn parse(url: &Url) -> Result<Self, LinkError> {
        let (id, key) = parse_link(url.path(), url.fragment())?;

        let mut base_url = url.clone();
        base_url.set_fragment(None);
        base_url.set_query(None);
        if let Ok(mut segments) = base_url.path_segments_mut() {
            segments.pop_if_empty().pop().pop();
        }

        Ok(Self { base_url, id, key })
    }
}
