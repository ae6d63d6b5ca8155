use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Longest identifier accepted from a path
pub const MAX_SECRET_ID_LEN: usize = 128;

/// Opaque identifier of a stored secret
///
/// Freshly generated ids are random UUIDv4 strings: 122 bits from the OS
/// CSPRNG, never sequential, so the store cannot be enumerated. Ids parsed
/// from a request path are only checked for shape; an unknown id simply
/// misses in the store.
///
/// Only URL-unreserved characters (`A-Z a-z 0-9 - . _ ~`) are accepted, so an
/// id reads the same in a link path as it does in the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SecretId(String);

impl SecretId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SecretIdError {
    #[error("secret id is empty")]
    Empty,
    #[error("secret id is longer than {MAX_SECRET_ID_LEN} characters")]
    TooLong,
    #[error("secret id may only contain A-Z, a-z, 0-9, '-', '.', '_' and '~'")]
    ReservedCharacter,
}

impl FromStr for SecretId {
    type Err = SecretIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(SecretIdError::Empty);
        }
        if s.len() > MAX_SECRET_ID_LEN {
            return Err(SecretIdError::TooLong);
        }
        let unreserved =
            |b: u8| b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~');
        if !s.bytes().all(unreserved) || s == "." || s == ".." {
            return Err(SecretIdError::ReservedCharacter);
        }
        Ok(Self(s.to_string()))
    }
}

impl TryFrom<String> for SecretId {
    type Error = SecretIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SecretId> for String {
    fn from(id: SecretId) -> Self {
        id.0
    }
}

impl AsRef<str> for SecretId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SecretId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
