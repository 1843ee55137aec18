//! # Stamp Builder
//!
//! Turns [`StampParams`] into a signed [`StampEnvelope`]:
//!
//! 1. `payloadHash = H(canonical(payload))`
//! 2. `metadataHash = H(canonical({type, date, holders, payloadHash}))`
//! 3. `signature = signer.sign(metadataHash)`
//!
//! `H` is the digest algorithm from [`StampConfig`]. The builder never
//! inspects the signature scheme; it only stores what the signer returns.

use cstamp_core::canonical::to_json_value;
use cstamp_core::{CanonicalizationError, Signer, Timestamp};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::{EnvelopeMode, StampConfig};
use crate::envelope::{payload_digest, MetadataRecord, StampEnvelope};
use crate::error::StampError;

/// Inputs for one stamp.
#[derive(Debug, Clone, PartialEq)]
pub struct StampParams {
    pub stamp_type: String,
    /// Defaults to an empty object.
    pub payload: Value,
    /// Defaults to the time of signing.
    pub date: Option<Timestamp>,
    pub holders: Option<Vec<String>>,
}

impl StampParams {
    pub fn new(stamp_type: impl Into<String>) -> Self {
        Self {
            stamp_type: stamp_type.into(),
            payload: Value::Object(Map::new()),
            date: None,
            holders: None,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Lower any serializable value to the payload. NaN and infinities are
    /// rejected rather than stored as `null`.
    pub fn with_serialized_payload(
        mut self,
        payload: &impl Serialize,
    ) -> Result<Self, CanonicalizationError> {
        self.payload = to_json_value(payload)?;
        Ok(self)
    }

    pub fn with_date(mut self, date: Timestamp) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_holders<I, S>(mut self, holders: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.holders = Some(holders.into_iter().map(Into::into).collect());
        self
    }
}

/// Build and sign a stamp.
///
/// # Errors
///
/// - `StampError::Canonicalization` if the payload cannot be canonicalized.
/// - `StampError::Capability` if the signer fails.
pub async fn create_stamp<S>(
    params: StampParams,
    signer: &S,
    config: &StampConfig,
) -> Result<StampEnvelope, StampError>
where
    S: Signer + ?Sized,
{
    let StampParams {
        stamp_type,
        payload,
        date,
        holders,
    } = params;
    let date = date.unwrap_or_else(Timestamp::now);

    let payload_hash = payload_digest(&payload, config.digest)?;
    let metadata_hash = MetadataRecord {
        stamp_type: &stamp_type,
        date: &date,
        holders: holders.as_deref(),
        payload_hash: &payload_hash,
    }
    .digest(config.digest)?;
    tracing::trace!(
        payload_hash = %payload_hash,
        metadata_hash = %metadata_hash,
        digest = %config.digest,
        "computed stamp hashes"
    );

    let mut signature = signer.sign(&metadata_hash).await?;
    if signature.signer.is_none() {
        signature.signer = config.owner.clone();
    }

    tracing::debug!(
        stamp_type = %stamp_type,
        alg = %signature.alg,
        date = %date,
        "created stamp"
    );

    let recorded = match config.mode {
        EnvelopeMode::Full => Some(metadata_hash),
        EnvelopeMode::Compact => None,
    };
    Ok(StampEnvelope::from_parts(
        stamp_type,
        date,
        holders,
        payload,
        payload_hash,
        recorded,
        signature,
    ))
}
