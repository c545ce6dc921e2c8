//! Content hashing: BLAKE3 digests used as blob names and storage keys.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// A 32-byte BLAKE3 hash identifying a blob's content. Doubles as the blob's
/// local filename and its object-store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlobHash(pub [u8; 32]);

impl BlobHash {
    /// Return the hash as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse a hex-encoded blob name. Rejects wrong lengths and non-hex
    /// characters; uppercase digits are accepted.
    pub fn from_hex(name: &str) -> CoreResult<Self> {
        let raw = name.as_bytes();
        if raw.len() != 64 {
            return Err(CoreError::InvalidHashName {
                name: name.to_string(),
                reason: format!("expected 64 hex characters, got {}", raw.len()),
            });
        }
        let digit = |b: u8| match b {
            b'0'..=b'9' => Some(b - b'0'),
            b'a'..=b'f' => Some(b - b'a' + 10),
            b'A'..=b'F' => Some(b - b'A' + 10),
            _ => None,
        };
        let mut out = [0u8; 32];
        for (i, byte) in out.iter_mut().enumerate() {
            let (hi, lo) = (digit(raw[i * 2]), digit(raw[i * 2 + 1]));
            match (hi, lo) {
                (Some(hi), Some(lo)) => *byte = (hi << 4) | lo,
                _ => {
                    return Err(CoreError::InvalidHashName {
                        name: name.to_string(),
                        reason: format!("non-hex characters at offset {}", i * 2),
                    })
                }
            }
        }
        Ok(BlobHash(out))
    }

    /// Return the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// True if `name` is the hex encoding of the hash of `data`.
    /// Case-insensitive on the name; any malformed name is a non-match.
    pub fn matches(name: &str, data: &[u8]) -> bool {
        match Self::from_hex(name) {
            Ok(claimed) => claimed == blob_hash(data),
            Err(_) => false,
        }
    }
}

impl std::fmt::Display for BlobHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the BLAKE3 hash of a blob's bytes.
pub fn blob_hash(data: &[u8]) -> BlobHash {
    let hash = blake3::hash(data);
    BlobHash(*hash.as_bytes())
}
