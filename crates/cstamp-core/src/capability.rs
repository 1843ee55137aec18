//! # Signer and Verifier Capabilities
//!
//! The stamp protocol never names a signature scheme. It hands the metadata
//! digest to a [`Signer`] and gets back a [`SignatureBlock`]; it hands the
//! recomputed digest and that block to a [`Verifier`] and gets back a
//! boolean. In-process keys, remote signing services and hardware tokens
//! are all substitutable behind these two traits.
//!
//! Both traits are `async` because signing and verification may perform I/O.
//! They are `Send + Sync` so one configured instance can serve concurrent
//! stamp and verify calls without locking.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::digest::ContentDigest;
use crate::error::CapabilityError;

/// The signature attached to a stamp envelope.
///
/// Opaque to the protocol except for `alg`, which a [`Verifier`] uses to
/// decide whether it can check the block at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureBlock {
    /// Algorithm identifier, e.g. `"ed25519"`.
    pub alg: String,

    /// Identifier of the signing key (public key hex, key id, URI).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signer: Option<String>,

    /// Encoded signature value.
    pub signature: String,

    /// Free-form fields a capability wants to carry alongside the signature.
    #[serde(flatten)]
    pub extensions: BTreeMap<String, Value>,
}

impl SignatureBlock {
    /// Create a block with no extension fields.
    pub fn new(
        alg: impl Into<String>,
        signer: Option<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            alg: alg.into(),
            signer,
            signature: signature.into(),
            extensions: BTreeMap::new(),
        }
    }
}

/// Produces a [`SignatureBlock`] over a metadata digest.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Sign the raw digest bytes.
    ///
    /// The returned block must carry the algorithm identifier so verification
    /// can route to a matching [`Verifier`].
    async fn sign(&self, digest: &ContentDigest) -> Result<SignatureBlock, CapabilityError>;
}

/// Checks a [`SignatureBlock`] against a recomputed metadata digest.
#[async_trait]
pub trait Verifier: Send + Sync {
    /// Returns `Ok(false)` for a bad signature **and** for an algorithm this
    /// verifier does not recognize. `Err` is reserved for the capability
    /// itself failing (unreachable service, hardware fault).
    async fn verify(
        &self,
        digest: &ContentDigest,
        block: &SignatureBlock,
    ) -> Result<bool, CapabilityError>;
}

#[async_trait]
impl<T: Signer + ?Sized> Signer for std::sync::Arc<T> {
    async fn sign(&self, digest: &ContentDigest) -> Result<SignatureBlock, CapabilityError> {
        (**self).sign(digest).await
    }
}

#[async_trait]
impl<T: Verifier + ?Sized> Verifier for std::sync::Arc<T> {
    async fn verify(
        &self,
        digest: &ContentDigest,
        block: &SignatureBlock,
    ) -> Result<bool, CapabilityError> {
        (**self).verify(digest, block).await
    }
}
