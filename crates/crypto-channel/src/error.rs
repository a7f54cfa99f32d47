//! Crypto channel error types

use std::path::PathBuf;

use thiserror::Error;
use wire_format::{Mode, ProtocolError};

/// Cryptographic operation error
#[derive(Debug, Error)]
pub enum CryptoError {
    #[error("Randomness source failed: {0}")]
    Rng(String),

    #[error("Key generation failed: {0}")]
    KeyGeneration(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Signing failed: {0}")]
    Signing(String),

    #[error("Decryption failed")]
    DecryptionFailed,

    #[error("Authentication tag mismatch")]
    AuthenticationFailed,

    #[error("Signature verification failed")]
    SignatureVerificationFailed,

    #[error("Message too long: {len} bytes (max: {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Modulus size mismatch: local key is {local} bytes, peer key is {peer} bytes")]
    ModulusMismatch { local: usize, peer: usize },

    #[error("Key material is for {actual} mode, {expected} mode requested")]
    ModeMismatch { expected: Mode, actual: Mode },

    #[error("Malformed frame: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Result type alias for cryptographic operations
pub type CryptoResult<T> = Result<T, CryptoError>;

/// Failure to decode a stored key block
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Malformed PEM block: {0}")]
    Pem(String),

    #[error("Malformed key encoding: {0}")]
    Der(String),

    #[error("Unexpected block label: expected '{expected}', found '{found}'")]
    LabelMismatch {
        expected: &'static str,
        found: String,
    },
}

/// Key material store error
#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("Key file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("Failed to encode key: {0}")]
    Encode(String),

    #[error("Public key in {} does not match its private key", .0.display())]
    KeyPairMismatch(PathBuf),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

impl KeyStoreError {
    /// The decode failure, if this error came from a malformed or mislabeled block
    pub fn as_decode_error(&self) -> Option<&DecodeError> {
        match self {
            Self::Decode { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type alias for key store operations
pub type KeyStoreResult<T> = Result<T, KeyStoreError>;
