//! One-shot UDP transport

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};

use bytes::Bytes;
use tokio::net::{UdpSocket, lookup_host};
use tracing::{debug, trace};

use crate::{MAX_DATAGRAM_SIZE, TransportError, TransportResult};

/// A UDP socket scoped to a single send or receive
///
/// The socket is closed when the value is dropped.
pub struct UdpTransport {
    socket: UdpSocket,
    local_addr: SocketAddr,
}

impl UdpTransport {
    /// Bind a listening socket on `addr` (e.g. `127.0.0.1:9999`)
    pub async fn bind(addr: &str) -> TransportResult<Self> {
        let bind_addr = resolve(addr).await?;
        let socket = UdpSocket::bind(bind_addr)
            .await
            .map_err(|source| TransportError::Bind {
                addr: addr.to_string(),
                source,
            })?;
        let local_addr = socket.local_addr()?;

        debug!("UDP socket bound to {}", local_addr);
        Ok(Self { socket, local_addr })
    }

    /// Open an ephemeral socket associated with `peer`
    pub async fn connect(peer: &str) -> TransportResult<Self> {
        let peer_addr = resolve(peer).await?;
        let any: SocketAddr = if peer_addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };

        let socket = UdpSocket::bind(any)
            .await
            .map_err(|source| TransportError::Bind {
                addr: any.to_string(),
                source,
            })?;
        socket
            .connect(peer_addr)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;
        let local_addr = socket.local_addr()?;

        debug!("UDP socket {} associated with {}", local_addr, peer_addr);
        Ok(Self { socket, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Send one datagram to the associated peer
    pub async fn send(&self, payload: &[u8]) -> TransportResult<usize> {
        if payload.len() > MAX_DATAGRAM_SIZE {
            return Err(TransportError::DatagramTooLarge {
                size: payload.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }

        let sent = self
            .socket
            .send(payload)
            .await
            .map_err(|e| TransportError::Send(e.to_string()))?;

        trace!("Sent {} bytes from {}", sent, self.local_addr);
        Ok(sent)
    }

    /// Wait for one datagram; there is no timeout
    ///
    /// Datagrams larger than the receive ceiling are rejected rather than
    /// silently truncated.
    pub async fn recv_one(&self) -> TransportResult<(Bytes, SocketAddr)> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE + 1];
        let (len, from) = self
            .socket
            .recv_from(&mut buf)
            .await
            .map_err(|e| TransportError::Receive(e.to_string()))?;

        if len > MAX_DATAGRAM_SIZE {
            return Err(TransportError::DatagramTooLarge {
                size: len,
                max: MAX_DATAGRAM_SIZE,
            });
        }

        buf.truncate(len);
        trace!("Received {} bytes from {}", len, from);
        Ok((Bytes::from(buf), from))
    }
}

/// Resolve `host:port` to the first matching socket address
pub async fn resolve(addr: &str) -> TransportResult<SocketAddr> {
    if let Ok(parsed) = addr.parse::<SocketAddr>() {
        return Ok(parsed);
    }

    lookup_host(addr)
        .await
        .map_err(|e| TransportError::AddressParse(format!("{addr}: {e}")))?
        .next()
        .ok_or_else(|| TransportError::AddressParse(format!("{addr}: no addresses found")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_loopback_datagram() {
        let listener = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().to_string();

        let sender = UdpTransport::connect(&addr).await.unwrap();
        assert_eq!(sender.send(b"ping").await.unwrap(), 4);

        let (payload, from) = listener.recv_one().await.unwrap();
        assert_eq!(payload.as_ref(), b"ping");
        assert_eq!(from.port(), sender.local_addr().port());
    }

    #[tokio::test]
    async fn test_receive_ceiling() {
        let listener = UdpTransport::bind("127.0.0.1:0").await.unwrap();
        let sender = UdpTransport::connect(&listener.local_addr().to_string())
            .await
            .unwrap();

        let err = sender.send(&[0u8; MAX_DATAGRAM_SIZE + 1]).await.unwrap_err();
        assert!(matches!(err, TransportError::DatagramTooLarge { .. }));

        sender.send(&[7u8; MAX_DATAGRAM_SIZE]).await.unwrap();
        let (payload, _) = listener.recv_one().await.unwrap();
        assert_eq!(payload.len(), MAX_DATAGRAM_SIZE);
    }

    #[tokio::test]
    async fn test_oversized_datagram_rejected_on_receive() {
        let listener = UdpTransport::bind("127.0.0.1:0").await.unwrap();

        // Bypass the send-side guard with a plain socket
        let raw = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        raw.send_to(&[1u8; MAX_DATAGRAM_SIZE + 100], listener.local_addr())
            .unwrap();

        let err = listener.recv_one().await.unwrap_err();
        assert!(matches!(
            err,
            TransportError::DatagramTooLarge {
                size,
                max: MAX_DATAGRAM_SIZE
            } if size > MAX_DATAGRAM_SIZE
        ));
    }

    #[tokio::test]
    async fn test_bad_address() {
        assert!(matches!(
            UdpTransport::connect("not an address").await,
            Err(TransportError::AddressParse(_))
        ));
    }

    #[tokio::test]
    async fn test_resolve_hostname() {
        let addr = resolve("localhost:9000").await.unwrap();
        assert_eq!(addr.port(), 9000);
        assert!(addr.ip().is_loopback());
    }
}
