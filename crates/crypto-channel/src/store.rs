//! On-disk key material store
//!
//! File layout inside the store directory:
//!
//! | File | Content | Mode |
//! |---|---|---|
//! | `<name>.sym` | raw 32-byte symmetric key | 0600 |
//! | `<name>.pem` | `RSA PRIVATE KEY` block, PKCS#1 DER | 0600 |
//! | `<name>.pub.pem` | `RSA PUBLIC KEY` block, SubjectPublicKeyInfo DER | 0644 |

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use rsa::pkcs1::{DecodeRsaPrivateKey, EncodeRsaPrivateKey};
use rsa::pkcs8::{DecodePublicKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{
    DEFAULT_RSA_BITS, DecodeError, KeyStoreError, KeyStoreResult, RsaKeyPair, SymmetricKey,
};

/// Block label for private keys
pub const PRIVATE_KEY_LABEL: &str = "RSA PRIVATE KEY";

/// Block label for public keys
pub const PUBLIC_KEY_LABEL: &str = "RSA PUBLIC KEY";

const SECRET_FILE_MODE: u32 = 0o600;
const PUBLIC_FILE_MODE: u32 = 0o644;

/// Generates, persists and loads key material under one directory
#[derive(Debug, Clone)]
pub struct KeyStore {
    dir: PathBuf,
}

impl KeyStore {
    /// Create a store rooted at `dir`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at the process working directory
    pub fn current_dir() -> Self {
        Self::new(".")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn symmetric_key_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.sym"))
    }

    pub fn private_key_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pem"))
    }

    pub fn public_key_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pub.pem"))
    }

    /// Generate a 32-byte symmetric key and write it to `<name>.sym`
    pub fn generate_symmetric_key(&self, name: &str) -> KeyStoreResult<SymmetricKey> {
        let key = SymmetricKey::generate()?;
        let path = self.symmetric_key_path(name);
        write_key_file(&path, key.as_bytes(), SECRET_FILE_MODE)?;

        info!("Generated symmetric key {}", path.display());
        Ok(key)
    }

    /// Generate a 2048-bit RSA key pair and write both halves
    pub fn generate_key_pair(&self, name: &str) -> KeyStoreResult<RsaKeyPair> {
        self.generate_key_pair_with_bits(name, DEFAULT_RSA_BITS)
    }

    /// Generate an RSA key pair of the given modulus size and write both halves
    pub fn generate_key_pair_with_bits(
        &self,
        name: &str,
        bits: usize,
    ) -> KeyStoreResult<RsaKeyPair> {
        let pair = RsaKeyPair::generate(bits)?;

        let private_der = pair
            .private_key()
            .to_pkcs1_der()
            .map_err(|e| KeyStoreError::Encode(e.to_string()))?;
        let private_pem = Zeroizing::new(pem::encode(&pem::Pem::new(
            PRIVATE_KEY_LABEL,
            private_der.as_bytes().to_vec(),
        )));
        let private_path = self.private_key_path(name);
        write_key_file(&private_path, private_pem.as_bytes(), SECRET_FILE_MODE)?;

        let public_der = pair
            .public_key()
            .to_public_key_der()
            .map_err(|e| KeyStoreError::Encode(e.to_string()))?;
        let public_pem = pem::encode(&pem::Pem::new(PUBLIC_KEY_LABEL, public_der.as_bytes()));
        let public_path = self.public_key_path(name);
        write_key_file(&public_path, public_pem.as_bytes(), PUBLIC_FILE_MODE)?;

        info!(
            "Generated {}-bit key pair {} / {}",
            bits,
            private_path.display(),
            public_path.display()
        );
        Ok(pair)
    }

    /// Load `<name>.sym`
    pub fn load_symmetric_key(&self, name: &str) -> KeyStoreResult<SymmetricKey> {
        let path = self.symmetric_key_path(name);
        let bytes = Zeroizing::new(read_key_file(&path)?);
        let key = SymmetricKey::from_slice(&bytes)?;

        debug!("Loaded symmetric key {}", path.display());
        Ok(key)
    }

    /// Load `<name>.pem` and `<name>.pub.pem` and check they belong together
    pub fn load_key_pair(&self, name: &str) -> KeyStoreResult<RsaKeyPair> {
        let private = self.load_private_key(name)?;
        let public = self.load_public_key(name)?;

        let pair = RsaKeyPair::from_parts(private, public)
            .ok_or_else(|| KeyStoreError::KeyPairMismatch(self.public_key_path(name)))?;

        debug!(
            "Loaded {}-bit key pair '{}'",
            pair.modulus_len() * 8,
            name
        );
        Ok(pair)
    }

    /// Load the private half `<name>.pem`
    pub fn load_private_key(&self, name: &str) -> KeyStoreResult<RsaPrivateKey> {
        let path = self.private_key_path(name);
        let contents = Zeroizing::new(read_key_file(&path)?);
        let der = Zeroizing::new(decode_block(&contents, PRIVATE_KEY_LABEL).map_err(
            |source| KeyStoreError::Decode {
                path: path.clone(),
                source,
            },
        )?);

        RsaPrivateKey::from_pkcs1_der(&der).map_err(|e| KeyStoreError::Decode {
            path,
            source: DecodeError::Der(e.to_string()),
        })
    }

    /// Load the public half `<name>.pub.pem`
    pub fn load_public_key(&self, name: &str) -> KeyStoreResult<RsaPublicKey> {
        let path = self.public_key_path(name);
        let contents = read_key_file(&path)?;
        let der = decode_block(&contents, PUBLIC_KEY_LABEL).map_err(|source| {
            KeyStoreError::Decode {
                path: path.clone(),
                source,
            }
        })?;

        RsaPublicKey::from_public_key_der(&der).map_err(|e| KeyStoreError::Decode {
            path,
            source: DecodeError::Der(e.to_string()),
        })
    }
}

impl Default for KeyStore {
    fn default() -> Self {
        Self::current_dir()
    }
}

/// Unwrap a labeled block, rejecting any label other than `expected`
fn decode_block(contents: &[u8], expected: &'static str) -> Result<Vec<u8>, DecodeError> {
    let block = pem::parse(contents).map_err(|e| DecodeError::Pem(e.to_string()))?;
    if block.tag() != expected {
        return Err(DecodeError::LabelMismatch {
            expected,
            found: block.tag().to_string(),
        });
    }
    Ok(block.into_contents())
}

fn read_key_file(path: &Path) -> KeyStoreResult<Vec<u8>> {
    fs::read(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => KeyStoreError::NotFound(path.to_path_buf()),
        _ => KeyStoreError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

fn write_key_file(path: &Path, contents: &[u8], mode: u32) -> KeyStoreResult<()> {
    let io_err = |source: std::io::Error| KeyStoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }

    let mut file = options.open(path).map_err(io_err)?;

    // `mode` only applies on creation; reset it before any key bytes land
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(mode))
            .map_err(io_err)?;
    }
    #[cfg(not(unix))]
    let _ = mode;

    file.write_all(contents).map_err(io_err)?;
    file.sync_all().map_err(io_err)?;

    Ok(())
}
