//! RSA PKCS#1 v1.5 encryption plus SHA-256 signature

use bytes::Bytes;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPublicKey};
use sha2::{Digest, Sha256};
use tracing::trace;
use wire_format::AsymmetricFrame;

use crate::{CryptoError, CryptoResult, DatagramCipher, PKCS1_V15_OVERHEAD, RsaKeyPair};

/// Seals to a peer and opens from that peer
///
/// `local` decrypts incoming ciphertext and signs outgoing messages;
/// `peer` is encrypted to and verified against. Both must share one
/// modulus size because the frame has a single segment size.
pub struct AsymmetricCipher<'a> {
    local: &'a RsaKeyPair,
    peer: &'a RsaPublicKey,
}

impl<'a> AsymmetricCipher<'a> {
    pub fn new(local: &'a RsaKeyPair, peer: &'a RsaPublicKey) -> CryptoResult<Self> {
        if local.modulus_len() != peer.size() {
            return Err(CryptoError::ModulusMismatch {
                local: local.modulus_len(),
                peer: peer.size(),
            });
        }
        Ok(Self { local, peer })
    }

    /// Ciphertext and signature segment size in bytes
    pub fn modulus_len(&self) -> usize {
        self.local.modulus_len()
    }

    /// Largest plaintext PKCS#1 v1.5 can carry under the peer key
    pub fn max_plaintext_len(&self) -> usize {
        self.peer.size().saturating_sub(PKCS1_V15_OVERHEAD)
    }

    /// Encrypt to the peer and sign with the local private key
    pub fn seal(&self, plaintext: &[u8]) -> CryptoResult<AsymmetricFrame> {
        let max = self.max_plaintext_len();
        if plaintext.len() > max {
            return Err(CryptoError::MessageTooLong {
                len: plaintext.len(),
                max,
            });
        }

        let ciphertext = self
            .peer
            .encrypt(&mut OsRng, Pkcs1v15Encrypt, plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let digest = Sha256::digest(plaintext);
        let signature = self
            .local
            .private_key()
            .sign(Pkcs1v15Sign::new::<Sha256>(), &digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;

        Ok(AsymmetricFrame {
            ciphertext: Bytes::from(ciphertext),
            signature: Bytes::from(signature),
        })
    }

    /// Decrypt with the local private key and verify the peer's signature
    pub fn open(&self, frame: &AsymmetricFrame) -> CryptoResult<Vec<u8>> {
        let plaintext = self
            .local
            .private_key()
            .decrypt_blinded(&mut OsRng, Pkcs1v15Encrypt, &frame.ciphertext)
            .map_err(|_| CryptoError::DecryptionFailed)?;

        let digest = Sha256::digest(&plaintext);
        self.peer
            .verify(Pkcs1v15Sign::new::<Sha256>(), &digest, &frame.signature)
            .map_err(|_| CryptoError::SignatureVerificationFailed)?;

        Ok(plaintext)
    }
}

impl DatagramCipher for AsymmetricCipher<'_> {
    fn seal_datagram(&self, plaintext: &[u8]) -> CryptoResult<Bytes> {
        let datagram = self.seal(plaintext)?.encode(self.modulus_len())?;
        trace!(
            "Sealed {} plaintext bytes into {} byte datagram",
            plaintext.len(),
            datagram.len()
        );
        Ok(datagram)
    }

    fn open_datagram(&self, datagram: &[u8]) -> CryptoResult<Vec<u8>> {
        let frame = AsymmetricFrame::parse(datagram, self.modulus_len())?;
        self.open(&frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;
    use wire_format::ProtocolError;

    // RSA generation is slow; share one pair set across tests
    fn pairs() -> &'static (RsaKeyPair, RsaKeyPair) {
        static PAIRS: OnceLock<(RsaKeyPair, RsaKeyPair)> = OnceLock::new();
        PAIRS.get_or_init(|| {
            (
                RsaKeyPair::generate(2048).unwrap(),
                RsaKeyPair::generate(2048).unwrap(),
            )
        })
    }

    #[test]
    fn test_sender_to_receiver() {
        let (a, b) = pairs();
        let sender = AsymmetricCipher::new(a, b.public_key()).unwrap();
        let receiver = AsymmetricCipher::new(b, a.public_key()).unwrap();

        let datagram = sender.seal_datagram(b"secret").unwrap();
        assert_eq!(datagram.len(), 512);
        assert_eq!(receiver.open_datagram(&datagram).unwrap(), b"secret");
    }

    #[test]
    fn test_plaintext_capacity() {
        let (a, b) = pairs();
        let sender = AsymmetricCipher::new(a, b.public_key()).unwrap();
        let receiver = AsymmetricCipher::new(b, a.public_key()).unwrap();
        assert_eq!(sender.max_plaintext_len(), 245);

        let largest = vec![0x5Au8; 245];
        let datagram = sender.seal_datagram(&largest).unwrap();
        assert_eq!(receiver.open_datagram(&datagram).unwrap(), largest);

        let err = sender.seal(&[0u8; 246]).unwrap_err();
        assert!(matches!(
            err,
            CryptoError::MessageTooLong { len: 246, max: 245 }
        ));
    }

    #[test]
    fn test_wrong_recipient_fails_decrypt() {
        let (a, b) = pairs();
        // Encrypted to B, but A tries to open it
        let sender = AsymmetricCipher::new(a, b.public_key()).unwrap();
        let wrong = AsymmetricCipher::new(a, a.public_key()).unwrap();

        let datagram = sender.seal_datagram(b"secret").unwrap();
        assert!(matches!(
            wrong.open_datagram(&datagram),
            Err(CryptoError::DecryptionFailed)
        ));
    }

    #[test]
    fn test_wrong_sender_fails_verification() {
        let (a, b) = pairs();
        // B signs its own message to itself; receiver expects A's signature
        let impostor = AsymmetricCipher::new(b, b.public_key()).unwrap();
        let receiver = AsymmetricCipher::new(b, a.public_key()).unwrap();

        let datagram = impostor.seal_datagram(b"secret").unwrap();
        assert!(matches!(
            receiver.open_datagram(&datagram),
            Err(CryptoError::SignatureVerificationFailed)
        ));
    }

    #[test]
    fn test_byte_flips_are_rejected() {
        let (a, b) = pairs();
        let sender = AsymmetricCipher::new(a, b.public_key()).unwrap();
        let receiver = AsymmetricCipher::new(b, a.public_key()).unwrap();
        let datagram = sender.seal_datagram(b"secret").unwrap();

        for i in 0..datagram.len() {
            let mut tampered = datagram.to_vec();
            tampered[i] ^= 0x80;

            match receiver.open_datagram(&tampered) {
                Err(CryptoError::DecryptionFailed)
                | Err(CryptoError::SignatureVerificationFailed) => {}
                other => panic!("byte {i}: unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_short_datagram_rejected() {
        let (a, b) = pairs();
        let receiver = AsymmetricCipher::new(b, a.public_key()).unwrap();

        for size in [0, 256, 511] {
            let err = receiver.open_datagram(&vec![0u8; size]).unwrap_err();
            assert!(matches!(
                err,
                CryptoError::Protocol(ProtocolError::FrameTooShort { min: 512, .. })
            ));
        }
    }

    #[test]
    fn test_segment_size_follows_modulus() {
        let a = RsaKeyPair::generate(1024).unwrap();
        let b = RsaKeyPair::generate(1024).unwrap();
        let sender = AsymmetricCipher::new(&a, b.public_key()).unwrap();
        let receiver = AsymmetricCipher::new(&b, a.public_key()).unwrap();

        let datagram = sender.seal_datagram(b"secret").unwrap();
        assert_eq!(datagram.len(), 256);
        assert_eq!(receiver.open_datagram(&datagram).unwrap(), b"secret");
    }

    #[test]
    fn test_mixed_modulus_sizes_rejected() {
        let (a, _) = pairs();
        let small = RsaKeyPair::generate(1024).unwrap();

        assert!(matches!(
            AsymmetricCipher::new(a, small.public_key()),
            Err(CryptoError::ModulusMismatch {
                local: 256,
                peer: 128
            })
        ));
    }
}
