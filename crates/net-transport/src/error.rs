//! Transport error types

use crypto_channel::CryptoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Address parse error: {0}")]
    AddressParse(String),

    #[error("Bind error on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Send error: {0}")]
    Send(String),

    #[error("Receive error: {0}")]
    Receive(String),

    #[error("Datagram too large: {size} bytes (max: {max})")]
    DatagramTooLarge { size: usize, max: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TransportResult<T> = Result<T, TransportError>;

/// Failure of one secure channel send or receive
#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("Network error: {0}")]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

pub type ChannelResult<T> = Result<T, ChannelError>;
