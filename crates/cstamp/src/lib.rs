//! # cstamp: Signed Stamp Envelopes
//!
//! Binds a payload to a type, a date and a list of holders with a
//! deterministic hash and a signature, and carries the result as a compact
//! `cryptostamp` token.
//!
//! ```text
//! payload ──canonical──▶ payloadHash ─┐
//! {type, date, holders, payloadHash} ─┴─canonical──▶ metadataHash ──Signer──▶ signature
//! ```
//!
//! Verification recomputes both hashes from the envelope and asks a
//! [`Verifier`](cstamp_core::Verifier) about the signature. Signature schemes
//! and key storage live behind the capability traits in `cstamp-core`; see
//! `cstamp-crypto` for the Ed25519 implementation.
//!
//! ## Entry Points
//!
//! - [`create_stamp`] / [`verify_stamp`]: one-shot functions.
//! - [`encode_token`] / [`decode_token`]: the wire codec.
//! - [`Stamper`]: configuration and capabilities bound once, reused.

pub mod builder;
pub mod config;
pub mod envelope;
pub mod error;
pub mod stamper;
pub mod token;
pub mod verify;

pub use builder::{create_stamp, StampParams};
pub use config::{EnvelopeMode, StampConfig};
pub use envelope::{payload_digest, StampEnvelope, METADATA_FIELDS};
pub use error::{StampError, StamperError, TokenError};
pub use stamper::Stamper;
pub use token::{
    decode_token, decode_token_with_head, encode_token, encode_token_with_head, TokenHead,
    PROTOCOL_VERSION, TOKEN_TYPE,
};
pub use verify::verify_stamp;
