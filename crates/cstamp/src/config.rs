//! # Stamp Configuration
//!
//! Immutable settings shared by stamping and verification. Loadable from
//! YAML so deployments can pin the digest algorithm next to other service
//! configuration:
//!
//! ```yaml
//! digest: sha3-256
//! mode: full
//! owner: user@host
//! ```
//!
//! Every field has a default, so an empty document is a valid config.

use cstamp_core::DigestAlgorithm;
use serde::{Deserialize, Serialize};

/// Which optional fields a built envelope carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeMode {
    /// Payload, hashes needed for verification and the signature.
    #[default]
    Compact,
    /// Additionally records `metadataHash` for debugging.
    Full,
}

/// Configuration for [`create_stamp`](crate::create_stamp) and
/// [`verify_stamp`](crate::verify_stamp).
///
/// Both sides of an exchange must agree on `digest`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StampConfig {
    /// Hash used for both the payload and the metadata record.
    pub digest: DigestAlgorithm,

    pub mode: EnvelopeMode,

    /// Signer identifier recorded when the signer capability reports none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl StampConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.digest = digest;
        self
    }

    pub fn with_mode(mut self, mode: EnvelopeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Parse a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        // An empty file deserializes as unit, not as an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(yaml)
    }
}
