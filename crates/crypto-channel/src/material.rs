//! Key material context loaded once at startup

use tracing::info;
use wire_format::Mode;

use crate::{
    AsymmetricCipher, CryptoError, CryptoResult, DatagramCipher, KeyStore, KeyStoreResult,
    RsaKeyPair, SymmetricCipher, SymmetricKey,
};

/// Default name of the sending party's key set
pub const SENDER_KEY_NAME: &str = "sender_crypt";

/// Default name of the receiving party's key set
pub const RECEIVER_KEY_NAME: &str = "receiver_crypt";

/// File stems for the two-party key set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySetNames {
    /// Sender key pair, and the shared symmetric key
    pub sender: String,
    /// Receiver key pair
    pub receiver: String,
}

impl Default for KeySetNames {
    fn default() -> Self {
        Self {
            sender: SENDER_KEY_NAME.to_string(),
            receiver: RECEIVER_KEY_NAME.to_string(),
        }
    }
}

/// Which end of the exchange this process plays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Sender,
    Receiver,
}

/// Both parties' RSA pairs, held together to run either end in one process
#[derive(Debug)]
pub struct AsymmetricKeys {
    pub sender: RsaKeyPair,
    pub receiver: RsaKeyPair,
}

impl AsymmetricKeys {
    /// Cipher for one side: the sender signs with its own key and encrypts
    /// to the receiver, the receiver decrypts with its own key and verifies
    /// the sender.
    pub fn cipher(&self, role: Role) -> CryptoResult<AsymmetricCipher<'_>> {
        match role {
            Role::Sender => AsymmetricCipher::new(&self.sender, self.receiver.public_key()),
            Role::Receiver => AsymmetricCipher::new(&self.receiver, self.sender.public_key()),
        }
    }
}

/// Immutable key set for one mode
///
/// Built once and shared by reference with every channel call.
#[derive(Debug)]
pub enum KeyMaterial {
    Symmetric(SymmetricKey),
    Asymmetric(AsymmetricKeys),
}

impl KeyMaterial {
    /// Create and persist fresh keys for `mode`
    pub fn generate(store: &KeyStore, mode: Mode, names: &KeySetNames) -> KeyStoreResult<Self> {
        let material = match mode {
            Mode::Symmetric => Self::Symmetric(store.generate_symmetric_key(&names.sender)?),
            Mode::Asymmetric => Self::Asymmetric(AsymmetricKeys {
                sender: store.generate_key_pair(&names.sender)?,
                receiver: store.generate_key_pair(&names.receiver)?,
            }),
        };

        info!("Initialized {} keys in {}", mode, store.dir().display());
        Ok(material)
    }

    /// Load previously generated keys for `mode`
    pub fn load(store: &KeyStore, mode: Mode, names: &KeySetNames) -> KeyStoreResult<Self> {
        Ok(match mode {
            Mode::Symmetric => Self::Symmetric(store.load_symmetric_key(&names.sender)?),
            Mode::Asymmetric => Self::Asymmetric(AsymmetricKeys {
                sender: store.load_key_pair(&names.sender)?,
                receiver: store.load_key_pair(&names.receiver)?,
            }),
        })
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Symmetric(_) => Mode::Symmetric,
            Self::Asymmetric(_) => Mode::Asymmetric,
        }
    }

    pub fn symmetric_cipher(&self) -> CryptoResult<SymmetricCipher<'_>> {
        match self {
            Self::Symmetric(key) => SymmetricCipher::new(key),
            Self::Asymmetric(_) => Err(CryptoError::ModeMismatch {
                expected: Mode::Symmetric,
                actual: Mode::Asymmetric,
            }),
        }
    }

    pub fn asymmetric_cipher(&self, role: Role) -> CryptoResult<AsymmetricCipher<'_>> {
        match self {
            Self::Asymmetric(keys) => keys.cipher(role),
            Self::Symmetric(_) => Err(CryptoError::ModeMismatch {
                expected: Mode::Asymmetric,
                actual: Mode::Symmetric,
            }),
        }
    }

    /// Cipher for whichever mode this material was loaded for
    ///
    /// The shared symmetric key is the same for both roles.
    pub fn cipher(&self, role: Role) -> CryptoResult<Box<dyn DatagramCipher + '_>> {
        let cipher: Box<dyn DatagramCipher + '_> = match self {
            Self::Symmetric(_) => Box::new(self.symmetric_cipher()?),
            Self::Asymmetric(keys) => Box::new(keys.cipher(role)?),
        };
        Ok(cipher)
    }
}
