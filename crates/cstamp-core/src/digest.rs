//! # Content Digest: Length-Prefixed Hashing
//!
//! Defines `ContentDigest` and `DigestAlgorithm`, the pluggable hash used for
//! both the payload hash and the metadata hash of a stamp.
//!
//! ## Security Invariant
//!
//! Every algorithm hashes `be_u32(len(input)) || input`, never the bare input.
//! The prefix removes the ambiguity between differently structured inputs
//! whose serializations would otherwise collide when concatenated.
//!
//! `ContentDigest` is computed from `CanonicalBytes` on every protocol path.
//! [`DigestAlgorithm::digest_bytes()`] exists for raw inputs such as the
//! published empty-input test vector.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::Sha256;
use sha3::{Digest, Keccak256, Sha3_256};

use crate::canonical::CanonicalBytes;
use crate::encoding::{from_hex, to_hex};
use crate::error::{CanonicalizationError, CoreError};

/// Length in bytes of every supported digest.
pub const DIGEST_LEN: usize = 32;

/// The hash algorithm a stamp configuration uses.
///
/// One instance must be used consistently for payload and metadata hashing.
/// All variants produce 32-byte outputs and all apply the length prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA3-256 (FIPS 202). The default and the test-vector algorithm.
    #[default]
    #[serde(rename = "sha3-256")]
    Sha3_256,
    /// Keccak-256 with the original (pre-FIPS) padding.
    #[serde(rename = "keccak256")]
    Keccak256,
    /// SHA-256 (FIPS 180-4).
    #[serde(rename = "sha256")]
    Sha256,
}

impl DigestAlgorithm {
    /// Returns the algorithm identifier string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sha3_256 => "sha3-256",
            Self::Keccak256 => "keccak256",
            Self::Sha256 => "sha256",
        }
    }

    /// Hash canonical bytes.
    ///
    /// Infallible because `CanonicalBytes` is length-checked at construction.
    pub fn digest(&self, data: &CanonicalBytes) -> ContentDigest {
        self.hash_prefixed(data.length_prefix(), data.as_bytes())
    }

    /// Hash raw bytes with the same length-prefixed construction.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::TooLarge` if `data` is longer than
    /// `u32::MAX` bytes.
    pub fn digest_bytes(&self, data: &[u8]) -> Result<ContentDigest, CanonicalizationError> {
        let prefix = u32::try_from(data.len())
            .map_err(|_| CanonicalizationError::TooLarge(data.len()))?
            .to_be_bytes();
        Ok(self.hash_prefixed(prefix, data))
    }

    fn hash_prefixed(&self, prefix: [u8; 4], data: &[u8]) -> ContentDigest {
        let bytes = match self {
            Self::Sha3_256 => finalize::<Sha3_256>(prefix, data),
            Self::Keccak256 => finalize::<Keccak256>(prefix, data),
            Self::Sha256 => finalize::<Sha256>(prefix, data),
        };
        ContentDigest(bytes)
    }
}

impl std::fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DigestAlgorithm {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sha3-256" => Ok(Self::Sha3_256),
            "keccak256" => Ok(Self::Keccak256),
            "sha256" => Ok(Self::Sha256),
            other => Err(CoreError::Decoding(format!(
                "unknown digest algorithm {other:?}"
            ))),
        }
    }
}

fn finalize<D: Digest>(prefix: [u8; 4], data: &[u8]) -> [u8; DIGEST_LEN] {
    let mut hasher = D::new();
    hasher.update(prefix);
    hasher.update(data);
    let out = hasher.finalize();
    let mut bytes = [0u8; DIGEST_LEN];
    bytes.copy_from_slice(&out);
    bytes
}

/// A 32-byte digest value.
///
/// Serializes as a lowercase hex string, which is how it appears in
/// envelopes, metadata records and tokens.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; DIGEST_LEN]);

impl ContentDigest {
    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Return the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        to_hex(&self.0)
    }

    /// Parse a digest from a 64-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self, CoreError> {
        let bytes = from_hex(hex)?;
        let arr: [u8; DIGEST_LEN] = bytes.try_into().map_err(|v: Vec<u8>| {
            CoreError::Decoding(format!(
                "digest must be {DIGEST_LEN} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(arr))
    }
}

impl Serialize for ContentDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let hex = String::deserialize(deserializer)?;
        Self::from_hex(&hex).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ContentDigest({}...)", to_hex(&self.0[..4]))
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}
