//! # Cryptographic Error Types
//!
//! Structured errors for key handling and derivation in `cstamp-crypto`.
//! Bad signatures are not errors: the verifier reports them as `false`.

use cstamp_core::{CapabilityError, CoreError};
use thiserror::Error;

/// Errors from cryptographic operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Invalid Ed25519 public key.
    #[error("invalid Ed25519 public key: {0}")]
    InvalidPublicKey(String),

    /// Invalid Ed25519 signing key or seed.
    #[error("invalid Ed25519 signing key: {0}")]
    InvalidSigningKey(String),

    /// Invalid Ed25519 signature encoding.
    #[error("invalid Ed25519 signature: {0}")]
    InvalidSignature(String),

    /// Hex decoding error.
    #[error("hex decode error: {0}")]
    HexDecode(#[from] CoreError),

    /// Key material is not configured where the provider expected it.
    #[error("key material unavailable: {0}")]
    KeyUnavailable(String),

    /// Key stretching needs at least one round.
    #[error("key stretching requires at least one iteration")]
    ZeroIterations,
}

impl From<CryptoError> for CapabilityError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::KeyUnavailable(msg) => CapabilityError::KeyUnavailable(msg),
            other => CapabilityError::Failed(other.to_string()),
        }
    }
}
