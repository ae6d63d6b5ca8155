//! Cryptographic primitives for one-time secrets
//!
//! Everything in this module runs on the client. The server only ever sees the
//! output of [`encrypt`], a [`SealedBlob`], and cannot decrypt it.
//!
//! # Scheme
//!
//! - A fresh 256-bit [`ShareKey`] is drawn from the OS CSPRNG for every secret.
//! - The UTF-8 plaintext is sealed with AES-256-GCM under a fresh random
//!   12-byte nonce, with no associated data.
//! - The blob is `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//!
//! Because each key seals exactly one message, a single random nonce per
//! encryption can never repeat under the same key. The API offers no way to
//! encrypt twice with a caller-held key.
//!
//! # Error hygiene
//!
//! A truncated blob, a tampered blob and a wrong key all surface as the same
//! "failed to decrypt secret" message so callers cannot be used as an oracle.

mod key;
mod sealed;

pub use key::{ShareKey, KEY_SIZE};
pub use sealed::{
    decode_blob, decrypt, encode_blob, encrypt, CryptoError, SealedBlob, MIN_BLOB_SIZE,
    NONCE_SIZE, TAG_SIZE,
};
