//! # Stamp Verification
//!
//! Two stages, both recomputed from the envelope's own fields:
//!
//! 1. If the payload is attached, its digest must equal `payloadHash`.
//! 2. The metadata digest is recomputed and handed to the [`Verifier`]
//!    together with the signature block.
//!
//! A stored `metadataHash` is ignored. Trust failures are `Ok(false)`.

use cstamp_core::Verifier;

use crate::config::StampConfig;
use crate::envelope::{payload_digest, StampEnvelope};
use crate::error::StampError;

/// Verify a stamp.
///
/// # Errors
///
/// Only for inputs that cannot be processed (canonicalization failure) or
/// a verifier capability that fails outright. A tampered payload, a bad
/// signature or an unknown algorithm return `Ok(false)`.
pub async fn verify_stamp<V>(
    envelope: &StampEnvelope,
    verifier: &V,
    config: &StampConfig,
) -> Result<bool, StampError>
where
    V: Verifier + ?Sized,
{
    if let Some(payload) = envelope.payload() {
        let recomputed = payload_digest(payload, config.digest)?;
        if recomputed != *envelope.payload_hash() {
            tracing::debug!(
                stored = %envelope.payload_hash(),
                recomputed = %recomputed,
                "payload hash mismatch"
            );
            return Ok(false);
        }
    }

    let metadata_hash = envelope.metadata().digest(config.digest)?;
    let trusted = verifier.verify(&metadata_hash, envelope.signature()).await?;
    if !trusted {
        tracing::debug!(
            alg = %envelope.signature().alg,
            metadata_hash = %metadata_hash,
            "signature rejected"
        );
    }
    Ok(trusted)
}
