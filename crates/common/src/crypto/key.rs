use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::sealed::CryptoError;

/// Size of an AES-256-GCM key in bytes (256 bits)
pub const KEY_SIZE: usize = 32;

/// A 256-bit symmetric key that seals exactly one secret
///
/// The key is generated by the sender, travels to the recipient inside the
/// fragment of the share link, and is never sent to or stored by the server.
/// Its `Debug` output is redacted and its bytes are wiped on drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct ShareKey([u8; KEY_SIZE]);

impl fmt::Debug for ShareKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ShareKey(<redacted>)")
    }
}

impl From<[u8; KEY_SIZE]> for ShareKey {
    fn from(bytes: [u8; KEY_SIZE]) -> Self {
        ShareKey(bytes)
    }
}

impl ShareKey {
    /// Generate a new random key using the OS CSPRNG
    ///
    /// # Errors
    ///
    /// Returns [`CryptoError::Unavailable`] if the platform cannot provide
    /// secure randomness.
    pub fn generate() -> Result<Self, CryptoError> {
        let mut buff = [0; KEY_SIZE];
        getrandom::getrandom(&mut buff).map_err(|_| CryptoError::Unavailable)?;
        Ok(Self(buff))
    }

    /// Import raw key material
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `KEY_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, CryptoError> {
        if data.len() != KEY_SIZE {
            return Err(CryptoError::InvalidKey {
                expected: KEY_SIZE,
                got: Some(data.len()),
            });
        }
        let mut buff = [0; KEY_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Raw key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    /// Encode the key for a URL fragment (URL-safe alphabet, no padding)
    pub fn to_base64url(&self) -> String {
        URL_SAFE_NO_PAD.encode(self.0)
    }

    /// Decode a key from a URL fragment.
    ///
    /// Trailing `=` padding is tolerated so links produced by tools that pad
    /// still open.
    pub fn from_base64url(encoded: &str) -> Result<Self, CryptoError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(encoded.trim_end_matches('='))
            .map_err(|_| CryptoError::InvalidKey {
                expected: KEY_SIZE,
                got: None,
            })?;
        Self::from_slice(&bytes)
    }
}
