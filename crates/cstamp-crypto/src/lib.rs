//! # cstamp-crypto: Ed25519 Capabilities
//!
//! Reference implementations of the `cstamp-core` capability traits:
//!
//! - **Ed25519** signing and verification over metadata digests
//!   ([`Ed25519Signer`], [`Ed25519Verifier`]).
//! - **Key providers** abstracting where the signing seed lives
//!   ([`LocalKeyProvider`], [`EnvKeyProvider`]).
//! - **Password stretching** for deriving a seed from low-entropy secrets
//!   ([`kdf`]). A key-supply convenience; it adds nothing to the stamp
//!   protocol's integrity guarantees.
//!
//! ## Crate Policy
//!
//! - Depends only on `cstamp-core` internally.
//! - No mocking of cryptographic operations in tests. All tests use real
//!   SHA-3, real SHA-256, real Ed25519.
//! - Private key material is never serialized, logged, or shown by `Debug`.

pub mod ed25519;
pub mod error;
pub mod kdf;
pub mod key_provider;

pub use ed25519::{
    Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature, Ed25519Signer, Ed25519Verifier,
    ED25519_ALG,
};
pub use error::CryptoError;
pub use key_provider::{EnvKeyProvider, KeyProvider, LocalKeyProvider, SIGNING_KEY_ENV};
