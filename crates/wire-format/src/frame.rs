//! Datagram layouts for both secure channel modes

use bytes::{BufMut, Bytes, BytesMut};

use crate::{
    AUTH_TAG_SIZE, MAX_DATAGRAM_SIZE, MIN_SYMMETRIC_FRAME_SIZE, NONCE_SIZE, ProtocolError,
    ProtocolResult,
};

/// Symmetric-mode datagram
///
/// Layout: `[nonce:12][ciphertext+AEAD tag:variable][auth tag:32]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricFrame {
    /// Per-message AEAD nonce
    pub nonce: [u8; NONCE_SIZE],
    /// AEAD output, ciphertext followed by its integrity tag
    pub sealed: Bytes,
    /// Keyed hash over the plaintext
    pub auth_tag: [u8; AUTH_TAG_SIZE],
}

impl SymmetricFrame {
    /// Total encoded size in bytes
    pub fn encoded_len(&self) -> usize {
        NONCE_SIZE + self.sealed.len() + AUTH_TAG_SIZE
    }

    /// Serialize into a single datagram payload
    pub fn encode(&self) -> ProtocolResult<Bytes> {
        let size = self.encoded_len();
        if size > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size,
                max: MAX_DATAGRAM_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(size);
        buf.put_slice(&self.nonce);
        buf.put_slice(&self.sealed);
        buf.put_slice(&self.auth_tag);
        Ok(buf.freeze())
    }

    /// Split a received datagram into its three segments
    ///
    /// Length is validated before anything else so that no cryptographic
    /// work is ever attempted on a truncated frame.
    pub fn parse(datagram: &[u8]) -> ProtocolResult<Self> {
        let size = datagram.len();
        if size < MIN_SYMMETRIC_FRAME_SIZE {
            return Err(ProtocolError::FrameTooShort {
                size,
                min: MIN_SYMMETRIC_FRAME_SIZE,
            });
        }
        if size > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size,
                max: MAX_DATAGRAM_SIZE,
            });
        }

        let (body, tag) = datagram.split_at(size - AUTH_TAG_SIZE);
        let (nonce_bytes, sealed) = body.split_at(NONCE_SIZE);

        let mut nonce = [0u8; NONCE_SIZE];
        nonce.copy_from_slice(nonce_bytes);
        let mut auth_tag = [0u8; AUTH_TAG_SIZE];
        auth_tag.copy_from_slice(tag);

        Ok(Self {
            nonce,
            sealed: Bytes::copy_from_slice(sealed),
            auth_tag,
        })
    }
}

/// Asymmetric-mode datagram
///
/// Layout: `[ciphertext:k][signature:k]` where `k` is the RSA modulus size
/// in bytes (256 for a 2048-bit key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AsymmetricFrame {
    pub ciphertext: Bytes,
    pub signature: Bytes,
}

impl AsymmetricFrame {
    /// Smallest valid frame for a given modulus size
    pub fn min_len(modulus_len: usize) -> usize {
        modulus_len * 2
    }

    /// Serialize into a single datagram payload
    ///
    /// Both segments must be exactly `modulus_len` bytes.
    pub fn encode(&self, modulus_len: usize) -> ProtocolResult<Bytes> {
        check_segment("ciphertext", modulus_len, self.ciphertext.len())?;
        check_segment("signature", modulus_len, self.signature.len())?;

        let size = Self::min_len(modulus_len);
        if size > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size,
                max: MAX_DATAGRAM_SIZE,
            });
        }

        let mut buf = BytesMut::with_capacity(size);
        buf.put_slice(&self.ciphertext);
        buf.put_slice(&self.signature);
        Ok(buf.freeze())
    }

    /// Split a received datagram: the trailing `modulus_len` bytes are the
    /// signature, everything before them is the ciphertext.
    pub fn parse(datagram: &[u8], modulus_len: usize) -> ProtocolResult<Self> {
        let size = datagram.len();
        let min = Self::min_len(modulus_len);
        if modulus_len == 0 || size < min {
            return Err(ProtocolError::FrameTooShort { size, min });
        }
        if size > MAX_DATAGRAM_SIZE {
            return Err(ProtocolError::PacketTooLarge {
                size,
                max: MAX_DATAGRAM_SIZE,
            });
        }

        let (ciphertext, signature) = datagram.split_at(size - modulus_len);
        check_segment("ciphertext", modulus_len, ciphertext.len())?;

        Ok(Self {
            ciphertext: Bytes::copy_from_slice(ciphertext),
            signature: Bytes::copy_from_slice(signature),
        })
    }
}

fn check_segment(segment: &'static str, expected: usize, actual: usize) -> ProtocolResult<()> {
    if expected != actual {
        return Err(ProtocolError::InvalidSegmentLength {
            segment,
            expected,
            actual,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AEAD_TAG_SIZE;

    fn sample_symmetric() -> SymmetricFrame {
        SymmetricFrame {
            nonce: [7u8; NONCE_SIZE],
            sealed: Bytes::from(vec![0xAB; 5 + AEAD_TAG_SIZE]),
            auth_tag: [9u8; AUTH_TAG_SIZE],
        }
    }

    #[test]
    fn test_symmetric_layout() {
        let frame = sample_symmetric();
        let bytes = frame.encode().unwrap();

        assert_eq!(bytes.len(), NONCE_SIZE + 5 + AEAD_TAG_SIZE + AUTH_TAG_SIZE);
        assert_eq!(&bytes[..NONCE_SIZE], &[7u8; NONCE_SIZE]);
        assert_eq!(&bytes[bytes.len() - AUTH_TAG_SIZE..], &[9u8; AUTH_TAG_SIZE]);
        assert_eq!(SymmetricFrame::parse(&bytes).unwrap(), frame);
    }

    #[test]
    fn test_symmetric_rejects_short_frames() {
        for size in [0, 1, 31, 32, 44, MIN_SYMMETRIC_FRAME_SIZE - 1] {
            let err = SymmetricFrame::parse(&vec![0u8; size]).unwrap_err();
            assert_eq!(
                err,
                ProtocolError::FrameTooShort {
                    size,
                    min: MIN_SYMMETRIC_FRAME_SIZE
                }
            );
        }
        assert!(SymmetricFrame::parse(&[0u8; MIN_SYMMETRIC_FRAME_SIZE]).is_ok());
    }

    #[test]
    fn test_symmetric_rejects_oversized() {
        let frame = SymmetricFrame {
            sealed: Bytes::from(vec![0u8; MAX_DATAGRAM_SIZE]),
            ..sample_symmetric()
        };
        assert!(matches!(
            frame.encode(),
            Err(ProtocolError::PacketTooLarge { .. })
        ));

        assert_eq!(
            SymmetricFrame::parse(&[0u8; MAX_DATAGRAM_SIZE + 1]).unwrap_err(),
            ProtocolError::PacketTooLarge {
                size: MAX_DATAGRAM_SIZE + 1,
                max: MAX_DATAGRAM_SIZE
            }
        );
        assert!(SymmetricFrame::parse(&[0u8; MAX_DATAGRAM_SIZE]).is_ok());
    }

    #[test]
    fn test_asymmetric_split_follows_modulus() {
        for modulus_len in [128usize, 256, 512] {
            let frame = AsymmetricFrame {
                ciphertext: Bytes::from(vec![1u8; modulus_len]),
                signature: Bytes::from(vec![2u8; modulus_len]),
            };
            let bytes = frame.encode(modulus_len).unwrap();
            assert_eq!(bytes.len(), modulus_len * 2);

            let parsed = AsymmetricFrame::parse(&bytes, modulus_len).unwrap();
            assert_eq!(parsed, frame);
        }
    }

    #[test]
    fn test_asymmetric_rejects_short_frames() {
        let err = AsymmetricFrame::parse(&[0u8; 511], 256).unwrap_err();
        assert_eq!(err, ProtocolError::FrameTooShort { size: 511, min: 512 });

        let err = AsymmetricFrame::parse(&[], 0).unwrap_err();
        assert!(matches!(err, ProtocolError::FrameTooShort { .. }));
    }

    #[test]
    fn test_asymmetric_rejects_long_ciphertext() {
        let err = AsymmetricFrame::parse(&[0u8; 513], 256).unwrap_err();
        assert_eq!(
            err,
            ProtocolError::InvalidSegmentLength {
                segment: "ciphertext",
                expected: 256,
                actual: 257
            }
        );
    }

    #[test]
    fn test_asymmetric_encode_checks_segments() {
        let frame = AsymmetricFrame {
            ciphertext: Bytes::from(vec![1u8; 256]),
            signature: Bytes::from(vec![2u8; 255]),
        };
        assert!(matches!(
            frame.encode(256),
            Err(ProtocolError::InvalidSegmentLength {
                segment: "signature",
                ..
            })
        ));
    }
}
