//! # Stamp Envelope
//!
//! The signed record handed back by [`create_stamp`](crate::create_stamp):
//! a payload, the metadata that describes it, both hashes and the signature.
//!
//! ## Wire Form
//!
//! ```json
//! {
//!   "type": "auth",
//!   "date": "1970-01-01T00:00:00.000Z",
//!   "holders": ["host1"],
//!   "payload": {},
//!   "payloadHash": "c0ad1c50...",
//!   "metadataHash": "836fb2fe...",
//!   "signature": {"alg": "ed25519", "signer": "3b6a27bc...", "signature": "fc0372cc..."}
//! }
//! ```
//!
//! `holders` and `payload` are optional on the wire; `metadataHash` is only
//! present for envelopes built in [`EnvelopeMode::Full`](crate::EnvelopeMode::Full)
//! and is never trusted during verification.
//!
//! ## Metadata Record
//!
//! The signature covers the digest of exactly `{type, date, holders,
//! payloadHash}`, canonicalized in the fixed order [`METADATA_FIELDS`].
//! The payload is bound only through `payloadHash`.

use cstamp_core::{
    CanonicalBytes, CanonicalizationError, ContentDigest, DigestAlgorithm, SignatureBlock,
    Timestamp,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Field order of the signed metadata record.
pub const METADATA_FIELDS: [&str; 4] = ["type", "date", "holders", "payloadHash"];

/// A signed stamp. Immutable: every field is read through an accessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampEnvelope {
    #[serde(rename = "type")]
    stamp_type: String,

    date: Timestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    holders: Option<Vec<String>>,

    #[serde(
        default,
        deserialize_with = "present_payload",
        skip_serializing_if = "Option::is_none"
    )]
    payload: Option<Value>,

    #[serde(rename = "payloadHash")]
    payload_hash: ContentDigest,

    #[serde(
        rename = "metadataHash",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    metadata_hash: Option<ContentDigest>,

    signature: SignatureBlock,
}

/// A `"payload": null` on the wire is a null payload, not a detached one.
fn present_payload<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(d).map(Some)
}

/// The record whose digest is signed.
#[derive(Serialize)]
pub(crate) struct MetadataRecord<'a> {
    #[serde(rename = "type")]
    pub stamp_type: &'a str,
    pub date: &'a Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holders: Option<&'a [String]>,
    #[serde(rename = "payloadHash")]
    pub payload_hash: &'a ContentDigest,
}

impl MetadataRecord<'_> {
    pub(crate) fn digest(
        &self,
        algorithm: DigestAlgorithm,
    ) -> Result<ContentDigest, CanonicalizationError> {
        let canonical = CanonicalBytes::with_field_order(self, &METADATA_FIELDS)?;
        Ok(algorithm.digest(&canonical))
    }
}

/// Digest of a payload's canonical form.
pub fn payload_digest(
    payload: &Value,
    algorithm: DigestAlgorithm,
) -> Result<ContentDigest, CanonicalizationError> {
    Ok(algorithm.digest(&CanonicalBytes::new(payload)?))
}

impl StampEnvelope {
    pub(crate) fn from_parts(
        stamp_type: String,
        date: Timestamp,
        holders: Option<Vec<String>>,
        payload: Value,
        payload_hash: ContentDigest,
        metadata_hash: Option<ContentDigest>,
        signature: SignatureBlock,
    ) -> Self {
        Self {
            stamp_type,
            date,
            holders,
            payload: Some(payload),
            payload_hash,
            metadata_hash,
            signature,
        }
    }

    /// Application-level stamp type, e.g. `"auth"`.
    pub fn stamp_type(&self) -> &str {
        &self.stamp_type
    }

    pub fn date(&self) -> &Timestamp {
        &self.date
    }

    pub fn holders(&self) -> Option<&[String]> {
        self.holders.as_deref()
    }

    /// The payload, or `None` if it was detached.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    pub fn payload_hash(&self) -> &ContentDigest {
        &self.payload_hash
    }

    /// Metadata digest recorded at build time (`Full` mode only).
    /// Verification always recomputes it.
    pub fn metadata_hash(&self) -> Option<&ContentDigest> {
        self.metadata_hash.as_ref()
    }

    pub fn signature(&self) -> &SignatureBlock {
        &self.signature
    }

    /// Return a copy without the payload.
    ///
    /// The signature still verifies, since it covers only `payloadHash`.
    /// The holder of the payload can later check it against
    /// [`payload_hash`](Self::payload_hash) with [`payload_matches`](Self::payload_matches).
    pub fn detach_payload(&self) -> Self {
        Self {
            payload: None,
            ..self.clone()
        }
    }

    /// Whether `payload` hashes to this envelope's `payloadHash`.
    pub fn payload_matches(
        &self,
        payload: &Value,
        algorithm: DigestAlgorithm,
    ) -> Result<bool, CanonicalizationError> {
        Ok(payload_digest(payload, algorithm)? == self.payload_hash)
    }

    pub(crate) fn metadata(&self) -> MetadataRecord<'_> {
        MetadataRecord {
            stamp_type: &self.stamp_type,
            date: &self.date,
            holders: self.holders.as_deref(),
            payload_hash: &self.payload_hash,
        }
    }
}
