//! Crypto Channel - Message Protection for cryptomessages
//!
//! Provides the key material store and the two sealing schemes:
//! AES-256-GCM with an HMAC-SHA256 tag over a shared key, and RSA
//! PKCS#1 v1.5 encryption with a SHA-256 signature over per-party keys.

mod asymmetric;
mod error;
mod keys;
mod material;
mod store;
mod symmetric;
mod traits;

pub use asymmetric::*;
pub use error::*;
pub use keys::*;
pub use material::*;
pub use store::*;
pub use symmetric::*;
pub use traits::*;

pub use wire_format::{
    AUTH_TAG_SIZE, DEFAULT_RSA_BITS, Mode, NONCE_SIZE, PKCS1_V15_OVERHEAD, SYMMETRIC_KEY_SIZE,
};
