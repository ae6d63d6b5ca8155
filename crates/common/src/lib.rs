/**
 * Client-side authenticated encryption.
 *  - Per-secret AES-256-GCM keys
 *  - Self-contained `nonce || ciphertext || tag` blobs
 */
pub mod crypto;
/**
 * Client-side flow for sharing and opening a secret,
 *  modelled as an explicit state machine.
 */
pub mod flow;
/**
 * Share link construction and parsing.
 * The decryption key only ever lives in the
 *  fragment of the link.
 */
pub mod link;
/**
 * Opaque identifiers assigned to stored secrets.
 */
pub mod secret_id;
/**
 * Helper for setting build version information
 *  at compile time.
 */
pub mod version;

pub mod prelude {
    pub use crate::crypto::{decrypt, encrypt, CryptoError, SealedBlob, ShareKey};
    pub use crate::flow::{Failure, Flow, FlowError};
    pub use crate::link::{build_link, parse_link, LinkError, ShareLink};
    pub use crate::secret_id::{SecretId, SecretIdError};
    pub use crate::version::build_info;
}
