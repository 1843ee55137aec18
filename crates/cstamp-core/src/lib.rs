//! # cstamp-core: Foundational Types for cstamp
//!
//! This crate is the leaf of the cstamp workspace. It defines the primitives
//! every stamp operation flows through. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** ALL digest computation flows through
//!    `CanonicalBytes::new()` or `CanonicalBytes::with_field_order()`. No raw
//!    `serde_json::to_vec()` for digests.
//!
//! 2. **Length-prefixed digests.** Every algorithm hashes
//!    `be_u32(len) || bytes`, so adjacent byte streams of differently
//!    structured inputs never collide under naive concatenation.
//!
//! 3. **UTC-only, millisecond timestamps.** `Timestamp` renders as
//!    `YYYY-MM-DDTHH:MM:SS.mmmZ`, so equivalent instants produce identical
//!    canonical bytes.
//!
//! 4. **Capabilities, not algorithms.** Signing and verification are reached
//!    through the [`Signer`] and [`Verifier`] traits. The protocol never names
//!    a signature scheme.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cstamp-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod capability;
pub mod digest;
pub mod encoding;
pub mod error;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use capability::{SignatureBlock, Signer, Verifier};
pub use digest::{ContentDigest, DigestAlgorithm, DIGEST_LEN};
pub use error::{CanonicalizationError, CapabilityError, CoreError};
pub use temporal::Timestamp;
