//! # Password-to-Seed Derivation
//!
//! Helpers that turn low-entropy secrets into 32-byte Ed25519 seeds.
//!
//! These are a key-supply convenience. A seed derived from a guessable
//! password is only as strong as the password; [`stretch`] raises the cost
//! of each guess but is not a memory-hard KDF.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::ed25519::Ed25519KeyPair;
use crate::error::CryptoError;

/// Apply SHA-256 `iterations` times to `secret`.
///
/// `stretch(s, 1) == SHA-256(s)`; `stretch(s, 2) == SHA-256(SHA-256(s))`.
pub fn stretch(secret: &[u8], iterations: u32) -> Result<Zeroizing<[u8; 32]>, CryptoError> {
    if iterations == 0 {
        return Err(CryptoError::ZeroIterations);
    }
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&Sha256::digest(secret));
    for _ in 1..iterations {
        let next = Sha256::digest(out.as_slice());
        out.copy_from_slice(&next);
    }
    Ok(out)
}

/// Derive a seed as `SHA-256("{user}|{password}|{n}")`, where `n` is the
/// combined length of user and password in UTF-16 code units.
pub fn seed_from_credentials(user: &str, password: &str) -> Zeroizing<[u8; 32]> {
    let units = user.encode_utf16().count() + password.encode_utf16().count();
    let material = Zeroizing::new(format!("{user}|{password}|{units}"));
    let mut out = Zeroizing::new([0u8; 32]);
    out.copy_from_slice(&Sha256::digest(material.as_bytes()));
    out
}

/// Key pair whose seed is [`seed_from_credentials`].
pub fn keypair_from_credentials(user: &str, password: &str) -> Ed25519KeyPair {
    Ed25519KeyPair::from_seed(&seed_from_credentials(user, password))
}
