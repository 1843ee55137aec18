//! Errors raised by stamp construction, verification and the token codec.
//!
//! A stamp that fails verification is not an error: `verify_stamp` returns
//! `Ok(false)`. These types cover inputs that cannot be processed at all.

use cstamp_core::{CanonicalizationError, CapabilityError};
use thiserror::Error;

/// Errors from building or verifying a stamp.
#[derive(Error, Debug)]
pub enum StampError {
    /// The payload or metadata record could not be canonicalized.
    #[error("canonicalization failed: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// `Stamper::stamp` was called on a stamper without a signer.
    #[error("no signing key configured")]
    MissingKey,

    /// The signer or verifier capability failed.
    #[error("capability error: {0}")]
    Capability(#[from] CapabilityError),
}

/// Errors from encoding or decoding a token.
#[derive(Error, Debug)]
pub enum TokenError {
    /// The token text is malformed. The message names the failing half.
    #[error("{0}")]
    Format(String),

    /// The head or envelope could not be serialized.
    #[error("token encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors from [`Stamper`](crate::Stamper) operations that span both the
/// protocol and the codec.
#[derive(Error, Debug)]
pub enum StamperError {
    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Stamp(#[from] StampError),
}
