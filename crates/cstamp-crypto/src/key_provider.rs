//! # Key Provider Abstraction
//!
//! Abstracts where the Ed25519 signing seed lives, so [`Ed25519Signer`]
//! works the same against any backend:
//!
//! - [`LocalKeyProvider`]: in-memory key for development, tests and CLI key files.
//! - [`EnvKeyProvider`]: seed loaded from an environment variable
//!   (hex-encoded, 32 bytes). Suitable for container deployments where
//!   secrets are injected via environment.
//!
//! ## Security Invariants
//!
//! - Seeds are zeroized on drop (`ed25519_dalek::SigningKey` is `ZeroizeOnDrop`).
//! - `KeyProvider` is `Send + Sync` for use across async tasks.
//! - Signing input is `&ContentDigest` (never raw bytes).
//!
//! [`Ed25519Signer`]: crate::Ed25519Signer

use cstamp_core::encoding::from_hex;
use cstamp_core::ContentDigest;
use zeroize::Zeroizing;

use crate::ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
use crate::error::CryptoError;

/// Environment variable read by [`EnvKeyProvider::from_default_env`].
pub const SIGNING_KEY_ENV: &str = "CSTAMP_SIGNING_KEY";

/// Trait for Ed25519 key storage and signing backends.
pub trait KeyProvider: Send + Sync {
    /// Sign a metadata digest with the managed key.
    fn sign(&self, digest: &ContentDigest) -> Result<Ed25519Signature, CryptoError>;

    /// Return the Ed25519 public key.
    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError>;

    /// Human-readable name for this provider (for diagnostics/logging).
    fn provider_name(&self) -> &str;
}

/// Decode a 64-character hex seed, wiping the intermediate buffer.
pub fn seed_from_hex(hex: &str) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    let bytes = Zeroizing::new(from_hex(hex)?);
    if bytes.len() != 32 {
        return Err(CryptoError::InvalidSigningKey(format!(
            "expected 32 bytes (64 hex chars), got {} bytes",
            bytes.len()
        )));
    }
    let mut seed = Zeroizing::new([0u8; 32]);
    seed.copy_from_slice(&bytes);
    Ok(seed)
}

// ─── LocalKeyProvider ────────────────────────────────────────────────────

/// In-memory Ed25519 key provider.
pub struct LocalKeyProvider {
    key: Ed25519KeyPair,
}

impl LocalKeyProvider {
    /// Wrap an existing key pair.
    pub fn new(key: Ed25519KeyPair) -> Self {
        Self { key }
    }

    /// Generate a new random key using the OS CSPRNG.
    pub fn generate() -> Self {
        Self::new(Ed25519KeyPair::generate())
    }

    /// Create from a raw 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(Ed25519KeyPair::from_seed(seed))
    }

    /// Create from a hex-encoded seed, as written by `cstamp keygen`.
    pub fn from_seed_hex(hex: &str) -> Result<Self, CryptoError> {
        let seed = seed_from_hex(hex)?;
        Ok(Self::from_seed(&seed))
    }
}

impl KeyProvider for LocalKeyProvider {
    fn sign(&self, digest: &ContentDigest) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.key.sign(digest))
    }

    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        Ok(self.key.public_key())
    }

    fn provider_name(&self) -> &str {
        "LocalKeyProvider"
    }
}

// ─── EnvKeyProvider ──────────────────────────────────────────────────────

/// Loads an Ed25519 signing seed from an environment variable.
///
/// The variable must hold a 64-character hex string. The key is read once
/// at construction and held in memory.
///
/// ```bash
/// export CSTAMP_SIGNING_KEY="9d61b19d..."  # 64 hex chars
/// ```
pub struct EnvKeyProvider {
    key: Ed25519KeyPair,
    var_name: String,
}

impl EnvKeyProvider {
    /// Load the signing key from the named environment variable.
    ///
    /// Returns `CryptoError::KeyUnavailable` if the variable is not set and
    /// `CryptoError::InvalidSigningKey` / `HexDecode` if it is malformed.
    pub fn from_env(var_name: &str) -> Result<Self, CryptoError> {
        let hex = Zeroizing::new(std::env::var(var_name).map_err(|_| {
            CryptoError::KeyUnavailable(format!("environment variable {var_name} not set"))
        })?);
        let seed = seed_from_hex(&hex).map_err(|e| match e {
            CryptoError::InvalidSigningKey(msg) => {
                CryptoError::InvalidSigningKey(format!("{var_name}: {msg}"))
            }
            other => other,
        })?;

        tracing::debug!(var = var_name, "loaded signing key from environment");
        Ok(Self {
            key: Ed25519KeyPair::from_seed(&seed),
            var_name: var_name.to_string(),
        })
    }

    /// Load from [`SIGNING_KEY_ENV`].
    pub fn from_default_env() -> Result<Self, CryptoError> {
        Self::from_env(SIGNING_KEY_ENV)
    }

    /// Return the environment variable name this provider was loaded from.
    pub fn var_name(&self) -> &str {
        &self.var_name
    }
}

impl KeyProvider for EnvKeyProvider {
    fn sign(&self, digest: &ContentDigest) -> Result<Ed25519Signature, CryptoError> {
        Ok(self.key.sign(digest))
    }

    fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        Ok(self.key.public_key())
    }

    fn provider_name(&self) -> &str {
        "EnvKeyProvider"
    }
}
