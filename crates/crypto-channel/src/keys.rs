//! In-memory key types

use rand::RngCore;
use rand::rngs::OsRng;
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::{CryptoError, CryptoResult, SYMMETRIC_KEY_SIZE};

/// Shared 256-bit secret used as both the AEAD key and the HMAC key
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; SYMMETRIC_KEY_SIZE]);

impl SymmetricKey {
    /// Draw a fresh key from the OS randomness source
    pub fn generate() -> CryptoResult<Self> {
        let mut bytes = [0u8; SYMMETRIC_KEY_SIZE];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CryptoError::Rng(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Wrap existing key material, which must be exactly 32 bytes
    pub fn from_slice(bytes: &[u8]) -> CryptoResult<Self> {
        if bytes.len() != SYMMETRIC_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: SYMMETRIC_KEY_SIZE,
                actual: bytes.len(),
            });
        }
        let mut key = [0u8; SYMMETRIC_KEY_SIZE];
        key.copy_from_slice(bytes);
        Ok(Self(key))
    }

    /// Raw key bytes
    pub fn as_bytes(&self) -> &[u8; SYMMETRIC_KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// RSA key pair owned by one party
#[derive(Clone)]
pub struct RsaKeyPair {
    private: RsaPrivateKey,
    public: RsaPublicKey,
}

impl RsaKeyPair {
    /// Generate a new key pair with a modulus of `bits` bits
    pub fn generate(bits: usize) -> CryptoResult<Self> {
        let private = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| CryptoError::KeyGeneration(e.to_string()))?;
        let public = private.to_public_key();
        Ok(Self { private, public })
    }

    /// Assemble a pair from separately loaded halves
    ///
    /// Returns `None` if the public key does not belong to the private key.
    pub fn from_parts(private: RsaPrivateKey, public: RsaPublicKey) -> Option<Self> {
        if private.to_public_key() != public {
            return None;
        }
        Some(Self { private, public })
    }

    pub fn private_key(&self) -> &RsaPrivateKey {
        &self.private
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public
    }

    /// Modulus size in bytes, which is also the ciphertext and signature size
    pub fn modulus_len(&self) -> usize {
        self.public.size()
    }
}

impl std::fmt::Debug for RsaKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RsaKeyPair")
            .field("modulus_bits", &(self.modulus_len() * 8))
            .finish_non_exhaustive()
    }
}
