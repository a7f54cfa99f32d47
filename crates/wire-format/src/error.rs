//! Error types for the wire format

use thiserror::Error;

/// Wire format error
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Frame too short: {size} bytes (min: {min})")]
    FrameTooShort { size: usize, min: usize },

    #[error("Packet too large: {size} bytes (max: {max})")]
    PacketTooLarge { size: usize, max: usize },

    #[error("Invalid {segment} length: expected {expected}, got {actual}")]
    InvalidSegmentLength {
        segment: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown mode '{0}', use 'hmac' or 'rsa'")]
    UnknownMode(String),
}

/// Result type alias for wire format operations
pub type ProtocolResult<T> = Result<T, ProtocolError>;
