//! Secure channel: one sealed datagram per send, one opened datagram per receive

use std::net::SocketAddr;

use crypto_channel::{AsymmetricCipher, DatagramCipher, SymmetricCipher};
use tracing::{debug, info};

use crate::{ChannelResult, UdpTransport};

/// Stateless sender/receiver over UDP for any datagram cipher
///
/// There is no session: each call is a complete protocol run that either
/// returns its result or fails with a specific error.
pub struct SecureChannel<C> {
    cipher: C,
}

/// AES-256-GCM + HMAC-SHA256 channel
pub type SymmetricChannel<'a> = SecureChannel<SymmetricCipher<'a>>;

/// RSA encryption + signature channel
pub type AsymmetricChannel<'a> = SecureChannel<AsymmetricCipher<'a>>;

impl<C: DatagramCipher> SecureChannel<C> {
    pub fn new(cipher: C) -> Self {
        Self { cipher }
    }

    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    /// Seal `plaintext` and send it to `peer` as a single datagram
    ///
    /// Returns the number of bytes put on the wire.
    pub async fn send(&self, peer: &str, plaintext: &[u8]) -> ChannelResult<usize> {
        let transport = UdpTransport::connect(peer).await?;
        let datagram = self.cipher.seal_datagram(plaintext)?;
        let sent = transport.send(&datagram).await?;

        info!("Sent {} byte datagram to {}", sent, peer);
        Ok(sent)
    }

    /// Bind `local` and wait for exactly one datagram
    pub async fn receive(&self, local: &str) -> ChannelResult<Vec<u8>> {
        self.listen(local).await?.receive().await
    }

    /// Bind `local` without waiting yet
    ///
    /// Lets a caller learn the bound address, or make sure the socket exists
    /// before the peer sends.
    pub async fn listen(&self, local: &str) -> ChannelResult<PendingReceive<'_, C>> {
        let transport = UdpTransport::bind(local).await?;
        Ok(PendingReceive {
            channel: self,
            transport,
        })
    }
}

/// A bound socket waiting for its single datagram
pub struct PendingReceive<'a, C> {
    channel: &'a SecureChannel<C>,
    transport: UdpTransport,
}

impl<C: DatagramCipher> PendingReceive<'_, C> {
    pub fn local_addr(&self) -> SocketAddr {
        self.transport.local_addr()
    }

    /// Receive, validate and open one datagram, then release the socket
    pub async fn receive(self) -> ChannelResult<Vec<u8>> {
        let (datagram, from) = self.transport.recv_one().await?;
        debug!("Received {} byte datagram from {}", datagram.len(), from);

        let plaintext = self.channel.cipher.open_datagram(&datagram)?;
        info!("Accepted {} byte message from {}", plaintext.len(), from);
        Ok(plaintext)
    }
}
