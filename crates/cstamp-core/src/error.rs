//! # Error Types
//!
//! Defines the error types shared by every cstamp crate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Structural failures (values that cannot be canonicalized, malformed
//!   encodings) are errors.
//! - Trust failures (hash mismatch, bad signature, unknown algorithm) are
//!   never errors. Verification reports them as `false`.

use thiserror::Error;

/// Top-level error type for `cstamp-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// A timestamp could not be parsed or is out of range.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Hex or base64url input could not be decoded.
    #[error("decode error: {0}")]
    Decoding(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// A field-ordered record must be a JSON object.
    #[error("field-ordered canonicalization requires an object, got {0}")]
    NotAnObject(&'static str),

    /// NaN and infinities have no canonical JSON form.
    #[error("non-finite number {0} cannot be canonicalized")]
    NonFinite(f64),

    /// The canonical form does not fit behind a 4-byte length prefix.
    #[error("canonical form of {0} bytes exceeds the 4-byte length prefix")]
    TooLarge(usize),

    /// JSON serialization failed (non-string map keys, failing `Serialize` impls).
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Failure raised by a [`Signer`](crate::Signer) or [`Verifier`](crate::Verifier)
/// implementation.
///
/// The core never retries; whatever the capability reports is propagated to
/// the caller unchanged.
#[derive(Error, Debug)]
pub enum CapabilityError {
    /// The capability has no usable key material.
    #[error("key unavailable: {0}")]
    KeyUnavailable(String),

    /// The capability could not complete the operation (remote service,
    /// hardware token, timeout).
    #[error("capability failed: {0}")]
    Failed(String),
}
