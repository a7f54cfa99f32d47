//! AES-256-GCM sealing with an additional HMAC-SHA256 tag

use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit},
};
use bytes::Bytes;
use hmac::{Hmac, Mac};
use rand::RngCore;
use rand::rngs::OsRng;
use sha2::Sha256;
use tracing::trace;
use wire_format::SymmetricFrame;

use crate::{AUTH_TAG_SIZE, CryptoError, CryptoResult, DatagramCipher, NONCE_SIZE, SymmetricKey};

type HmacSha256 = Hmac<Sha256>;

/// Seals and opens symmetric-mode frames with one shared key
///
/// The same key drives both the AEAD and the HMAC. The AEAD tag already
/// covers integrity; the HMAC over the plaintext is kept for wire
/// compatibility and both are checked on open.
pub struct SymmetricCipher<'a> {
    cipher: Aes256Gcm,
    key: &'a SymmetricKey,
}

impl<'a> SymmetricCipher<'a> {
    pub fn new(key: &'a SymmetricKey) -> CryptoResult<Self> {
        let cipher = Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: crate::SYMMETRIC_KEY_SIZE,
                actual: key.as_bytes().len(),
            }
        })?;
        Ok(Self { cipher, key })
    }

    /// Encrypt and tag `plaintext` under a fresh random nonce
    pub fn seal(&self, plaintext: &[u8]) -> CryptoResult<SymmetricFrame> {
        let mut nonce = [0u8; NONCE_SIZE];
        OsRng
            .try_fill_bytes(&mut nonce)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;

        let sealed = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let auth_tag = self.auth_tag(plaintext)?;

        Ok(SymmetricFrame {
            nonce,
            sealed: Bytes::from(sealed),
            auth_tag,
        })
    }

    /// Decrypt a frame and check both tags
    ///
    /// AEAD failure aborts before the HMAC is looked at.
    pub fn open(&self, frame: &SymmetricFrame) -> CryptoResult<Vec<u8>> {
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(&frame.nonce), frame.sealed.as_ref())
            .map_err(|_| CryptoError::DecryptionFailed)?;

        let mut mac = self.mac()?;
        mac.update(&plaintext);
        mac.verify_slice(&frame.auth_tag)
            .map_err(|_| CryptoError::AuthenticationFailed)?;

        Ok(plaintext)
    }

    fn auth_tag(&self, plaintext: &[u8]) -> CryptoResult<[u8; AUTH_TAG_SIZE]> {
        let mut mac = self.mac()?;
        mac.update(plaintext);

        let mut tag = [0u8; AUTH_TAG_SIZE];
        tag.copy_from_slice(&mac.finalize().into_bytes());
        Ok(tag)
    }

    fn mac(&self) -> CryptoResult<HmacSha256> {
        <HmacSha256 as Mac>::new_from_slice(self.key.as_bytes()).map_err(|_| {
            CryptoError::InvalidKeyLength {
                expected: crate::SYMMETRIC_KEY_SIZE,
                actual: self.key.as_bytes().len(),
            }
        })
    }
}

impl DatagramCipher for SymmetricCipher<'_> {
    fn seal_datagram(&self, plaintext: &[u8]) -> CryptoResult<Bytes> {
        let datagram = self.seal(plaintext)?.encode()?;
        trace!(
            "Sealed {} plaintext bytes into {} byte datagram",
            plaintext.len(),
            datagram.len()
        );
        Ok(datagram)
    }

    fn open_datagram(&self, datagram: &[u8]) -> CryptoResult<Vec<u8>> {
        let frame = SymmetricFrame::parse(datagram)?;
        self.open(&frame)
    }
}
