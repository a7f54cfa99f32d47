//! Wire Format Definitions for cryptomessages
//!
//! Frame layouts, size constants and the mode selector shared by the
//! symmetric and asymmetric secure channels.

mod error;
mod frame;
mod mode;

pub use error::*;
pub use frame::*;
pub use mode::*;

/// AEAD nonce size (96 bits / 12 bytes)
pub const NONCE_SIZE: usize = 12;

/// AEAD integrity tag size embedded in the sealed payload (128 bits / 16 bytes)
pub const AEAD_TAG_SIZE: usize = 16;

/// Keyed-hash authentication tag size (HMAC-SHA256, 32 bytes)
pub const AUTH_TAG_SIZE: usize = 32;

/// Shared symmetric key size (256 bits / 32 bytes)
pub const SYMMETRIC_KEY_SIZE: usize = 32;

/// Smallest valid symmetric frame: nonce, tag of an empty plaintext, auth tag
pub const MIN_SYMMETRIC_FRAME_SIZE: usize = NONCE_SIZE + AEAD_TAG_SIZE + AUTH_TAG_SIZE;

/// Receive buffer ceiling for a single datagram
pub const MAX_DATAGRAM_SIZE: usize = 4096;

/// Default RSA modulus size in bits
pub const DEFAULT_RSA_BITS: usize = 2048;

/// PKCS#1 v1.5 encryption padding overhead in bytes
pub const PKCS1_V15_OVERHEAD: usize = 11;
