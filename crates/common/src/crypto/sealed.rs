//! AES-256-GCM sealing of a single text secret
//!
//! Wire format: `nonce (12 bytes) || ciphertext || auth_tag (16 bytes)`.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::key::ShareKey;

/// Size of AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of AES-GCM authentication tag in bytes
pub const TAG_SIZE: usize = 16;
/// Smallest well-formed blob: a nonce and a tag around an empty ciphertext
pub const MIN_BLOB_SIZE: usize = NONCE_SIZE + TAG_SIZE;

/// Errors that can occur during encryption/decryption
///
/// Every decryption failure shares one message. `InvalidKey` keeps the
/// decoded key length for logs; `got` is `None` when the key text was not
/// base64 at all.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("secure random or cipher primitives are unavailable")]
    Unavailable,
    #[error("failed to decrypt secret")]
    MalformedBlob,
    #[error("failed to decrypt secret")]
    AuthenticationFailed,
    #[error("failed to decrypt secret")]
    InvalidKey { expected: usize, got: Option<usize> },
}

impl CryptoError {
    /// True for every error a recipient can hit while opening a secret
    pub fn is_decryption_failure(&self) -> bool {
        matches!(
            self,
            CryptoError::MalformedBlob
                | CryptoError::AuthenticationFailed
                | CryptoError::InvalidKey { .. }
        )
    }
}

/// A sealed secret: `nonce || ciphertext || tag`
///
/// Opaque to the server. Construction from untrusted bytes only checks the
/// minimum length; authenticity is established by [`decrypt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedBlob(Vec<u8>);

impl SealedBlob {
    /// Wrap raw bytes, rejecting anything too short to hold a nonce and tag
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, CryptoError> {
        if bytes.len() < MIN_BLOB_SIZE {
            return Err(CryptoError::MalformedBlob);
        }
        Ok(Self(bytes))
    }

    /// Decode a blob from its wire (standard base64) form
    pub fn from_base64(encoded: &str) -> Result<Self, CryptoError> {
        Self::from_bytes(decode_blob(encoded)?)
    }

    pub fn to_base64(&self) -> String {
        encode_blob(&self.0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn nonce(&self) -> &[u8] {
        &self.0[..NONCE_SIZE]
    }
}

impl AsRef<[u8]> for SealedBlob {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Encode blob bytes for a JSON body
pub fn encode_blob(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Decode blob bytes from a JSON body
pub fn decode_blob(encoded: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(encoded.trim())
        .map_err(|_| CryptoError::MalformedBlob)
}

/// Seal `plaintext` under a freshly generated key.
///
/// Returns the blob to upload and the key to place in the share link.
///
/// # Errors
///
/// Returns [`CryptoError::Unavailable`] if the CSPRNG or the cipher cannot be
/// used.
pub fn encrypt(plaintext: &str) -> Result<(SealedBlob, ShareKey), CryptoError> {
    let key = ShareKey::generate()?;
    let cipher = Aes256Gcm::new_from_slice(key.bytes()).map_err(|_| CryptoError::Unavailable)?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    getrandom::getrandom(&mut nonce_bytes).map_err(|_| CryptoError::Unavailable)?;
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CryptoError::Unavailable)?;

    let mut out = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    out.extend_from_slice(&nonce_bytes);
    out.extend_from_slice(&ciphertext);

    Ok((SealedBlob(out), key))
}

/// Open a blob produced by [`encrypt`].
///
/// Decryption is all-or-nothing: either the full, authenticated plaintext is
/// returned or an error is.
///
/// # Errors
///
/// - [`CryptoError::MalformedBlob`] if the blob is shorter than a nonce plus a
///   tag (checked before any cryptography runs)
/// - [`CryptoError::AuthenticationFailed`] for a wrong key, a corrupted or
///   truncated ciphertext, or tampering
pub fn decrypt(blob: &[u8], key: &ShareKey) -> Result<String, CryptoError> {
    if blob.len() < MIN_BLOB_SIZE {
        return Err(CryptoError::MalformedBlob);
    }

    let (nonce_bytes, sealed) = blob.split_at(NONCE_SIZE);
    let cipher = Aes256Gcm::new_from_slice(key.bytes()).map_err(|_| CryptoError::Unavailable)?;
    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce_bytes), sealed)
        .map_err(|_| CryptoError::AuthenticationFailed)?;

    // Only an honest sender's UTF-8 passes the tag; anything else is treated
    // the same as a forgery.
    String::from_utf8(plaintext).map_err(|_| CryptoError::AuthenticationFailed)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_encrypt_decrypt() {
        let plaintext = "hello world, this is a test message for encryption";

        let (blob, key) = encrypt(plaintext).unwrap();
        let decrypted = decrypt(blob.as_bytes(), &key).unwrap();

        assert_eq!(decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let (blob, key) = encrypt("").unwrap();
        assert_eq!(blob.len(), MIN_BLOB_SIZE);
        assert_eq!(decrypt(blob.as_bytes(), &key).unwrap(), "");
    }

    #[test]
    fn test_unicode_and_large_plaintext() {
        let unicode = "pässwörd 🔑 — 秘密";
        let (blob, key) = encrypt(unicode).unwrap();
        assert_eq!(decrypt(blob.as_bytes(), &key).unwrap(), unicode);

        let large = "0123456789abcdef".repeat(1024);
        let (blob, key) = encrypt(&large).unwrap();
        assert_eq!(blob.len(), MIN_BLOB_SIZE + large.len());
        assert_eq!(decrypt(blob.as_bytes(), &key).unwrap(), large);
    }

    #[test]
    fn test_blob_layout() {
        let (blob, _) = encrypt("launch code 42").unwrap();
        assert_eq!(blob.len(), NONCE_SIZE + "launch code 42".len() + TAG_SIZE);
        assert_eq!(blob.nonce().len(), NONCE_SIZE);
    }

    #[test]
    fn test_fresh_key_and_nonce_per_encryption() {
        let (blob_a, key_a) = encrypt("same").unwrap();
        let (blob_b, key_b) = encrypt("same").unwrap();
        assert_ne!(key_a, key_b);
        assert_ne!(blob_a.nonce(), blob_b.nonce());
        assert_ne!(blob_a, blob_b);
    }

    #[test]
    fn test_every_single_bit_flip_is_rejected() {
        let (blob, key) = encrypt("tamper").unwrap();

        for byte in 0..blob.len() {
            for bit in 0..8 {
                let mut tampered = blob.as_bytes().to_vec();
                tampered[byte] ^= 1 << bit;
                let result = decrypt(&tampered, &key);
                assert!(
                    matches!(result, Err(CryptoError::AuthenticationFailed)),
                    "flip of byte {} bit {} was not rejected",
                    byte,
                    bit
                );
            }
        }
    }

    #[test]
    fn test_wrong_key_fails() {
        let (blob, _) = encrypt("for someone else").unwrap();
        let other = ShareKey::generate().unwrap();

        let result = decrypt(blob.as_bytes(), &other);
        assert!(matches!(result, Err(CryptoError::AuthenticationFailed)));
    }

    #[test]
    fn test_short_blob_is_malformed() {
        let key = ShareKey::generate().unwrap();
        for len in [0, 1, NONCE_SIZE, MIN_BLOB_SIZE - 1] {
            let result = decrypt(&vec![0u8; len], &key);
            assert!(matches!(result, Err(CryptoError::MalformedBlob)));
        }
        assert!(SealedBlob::from_bytes(vec![0u8; MIN_BLOB_SIZE - 1]).is_err());
    }

    #[test]
    fn test_truncated_blob_fails() {
        let (blob, key) = encrypt("truncate me please").unwrap();
        let truncated = &blob.as_bytes()[..blob.len() - 1];
        assert!(matches!(
            decrypt(truncated, &key),
            Err(CryptoError::AuthenticationFailed)
        ));
    }

    #[test]
    fn test_decrypt_errors_are_indistinguishable() {
        let (blob, key) = encrypt("secret").unwrap();
        let wrong_key = decrypt(blob.as_bytes(), &ShareKey::generate().unwrap()).unwrap_err();
        let malformed = decrypt(&blob.as_bytes()[..4], &key).unwrap_err();

        assert_eq!(wrong_key.to_string(), malformed.to_string());
        assert!(wrong_key.is_decryption_failure());
        assert!(malformed.is_decryption_failure());
    }

    #[test]
    fn test_base64_wire_form() {
        let (blob, key) = encrypt("over the wire").unwrap();
        let wire = blob.to_base64();
        let decoded = SealedBlob::from_base64(&wire).unwrap();
        assert_eq!(decrypt(decoded.as_bytes(), &key).unwrap(), "over the wire");

        assert!(matches!(
            SealedBlob::from_base64("not base64!"),
            Err(CryptoError::MalformedBlob)
        ));
    }
}
