//! Cipher abstraction used by the transport layer

use bytes::Bytes;

use crate::CryptoResult;

/// Turns one plaintext into one datagram and back
///
/// Implementations are stateless: every call is an independent protocol run.
pub trait DatagramCipher: Send + Sync {
    /// Encrypt and authenticate `plaintext` into a wire-ready datagram
    fn seal_datagram(&self, plaintext: &[u8]) -> CryptoResult<Bytes>;

    /// Validate, decrypt and authenticate a received datagram
    fn open_datagram(&self, datagram: &[u8]) -> CryptoResult<Vec<u8>>;
}

impl<T: DatagramCipher + ?Sized> DatagramCipher for Box<T> {
    fn seal_datagram(&self, plaintext: &[u8]) -> CryptoResult<Bytes> {
        (**self).seal_datagram(plaintext)
    }

    fn open_datagram(&self, datagram: &[u8]) -> CryptoResult<Vec<u8>> {
        (**self).open_datagram(datagram)
    }
}
