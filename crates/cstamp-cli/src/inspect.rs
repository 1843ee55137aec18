//! # Inspection Subcommands
//!
//! - `cstamp decode <TOKEN>` prints head and envelope as pretty JSON,
//!   without verifying anything.
//! - `cstamp hash [FILE]` prints the length-prefixed digest of a JSON
//!   document's canonical form, i.e. the value a stamp would record as
//!   `payloadHash`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use cstamp::{decode_token_with_head, StampConfig};
use cstamp_core::{CanonicalBytes, ContentDigest, DigestAlgorithm};
use serde_json::{json, Value};

/// Arguments for `cstamp decode`.
#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// The token (`-` reads it from stdin).
    #[arg(value_name = "TOKEN")]
    pub token: String,
}

/// Arguments for `cstamp hash`.
#[derive(Args, Debug)]
pub struct HashArgs {
    /// JSON document. Reads stdin when omitted.
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Also print the canonical form.
    #[arg(long)]
    pub show_canonical: bool,
}

/// Execute `cstamp decode`.
pub fn run_decode(args: &DecodeArgs) -> Result<u8> {
    let token = crate::token_arg(&args.token)?;
    let decoded = decode_to_json(&token)?;
    println!("{}", serde_json::to_string_pretty(&decoded)?);
    Ok(0)
}

/// Token as `{"head": ..., "envelope": ...}`.
pub fn decode_to_json(token: &str) -> Result<Value> {
    let (head, envelope) = decode_token_with_head(token).context("failed to decode token")?;
    let head = serde_json::to_value(head)?;
    let envelope = serde_json::to_value(envelope)?;
    Ok(json!({ "head": head, "envelope": envelope }))
}

/// Execute `cstamp hash`.
pub fn run_hash(args: &HashArgs, config: &StampConfig) -> Result<u8> {
    let (canonical, digest) = hash_document(args.file.as_deref(), config.digest)?;
    if args.show_canonical {
        println!("{}", String::from_utf8_lossy(canonical.as_bytes()));
    }
    println!("{digest}");
    Ok(0)
}

/// Canonical form and digest of a JSON document read from `path` or stdin.
fn hash_document(
    path: Option<&Path>,
    algorithm: DigestAlgorithm,
) -> Result<(CanonicalBytes, ContentDigest)> {
    let document = crate::read_json(path)?;
    let canonical = CanonicalBytes::new(&document).context("failed to canonicalize document")?;
    let digest = algorithm.digest(&canonical);
    Ok((canonical, digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_shows_head_and_envelope() {
        let token = concat!(
            "eyJ0eXBlIjoiY3J5cHRvc3RhbXAiLCJ2ZXJzaW9uIjoiMS4wIn0.",
            "eyJ0eXBlIjoiYXV0aCIsImRhdGUiOiIxOTcwLTAxLTAxVDAwOjAwOjAwLjAwMFoiLCJob2xkZXJzIjpbImhvc3QxIl0sInBheWxvYWQiOnt9LCJwYXlsb2FkSGFzaCI6ImMwYWQxYzUwMjA3Y2FjNWIzMGU1OTBlMDc4NGM4ZDJmNjhjZWI4NmYzNzY1OGQzMGE4ZmU2N2FjMTlmYWY5OTIiLCJzaWduYXR1cmUiOnsiYWxnIjoiZWQyNTUxOSIsInNpZ25lciI6IjNiNmEyN2JjY2ViNmE0MmQ2MmEzYThkMDJhNmYwZDczNjUzMjE1NzcxZGUyNDNhNjNhYzA0OGExOGI1OWRhMjkiLCJzaWduYXR1cmUiOiJmYzAzNzJjYzY5OGM1YmNiNzViNTNiZTRiODhhMTNmM2U1ZDEwOGVkMGJiZWJkZWRlZWQ0NTdjYTU3NzNkN2I3OGU2NjU5NzE0NTFlN2I3MjIwZDI3ZTZhNzAzYTgwOTMwYjY3YWZkZjVhYmQ2ZmU1ZWIxOTM2MmU2YTQ2MzgwNyJ9fQ",
        );
        let decoded = decode_to_json(token).unwrap();
        assert_eq!(decoded["head"]["type"], "cryptostamp");
        assert_eq!(decoded["head"]["version"], "1.0");
        assert_eq!(decoded["envelope"]["type"], "auth");
        assert_eq!(decoded["envelope"]["signature"]["alg"], "ed25519");
    }

    #[test]
    fn decode_rejects_garbage() {
        assert!(decode_to_json("garbage").is_err());
    }

    #[test]
    fn hashed_document_matches_payload_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.json");
        std::fs::write(&path, "{ }\n").unwrap();
        let (canonical, digest) = hash_document(Some(&path), DigestAlgorithm::Sha3_256).unwrap();
        assert_eq!(canonical.as_bytes(), b"{}");
        assert_eq!(
            digest.to_hex(),
            "c0ad1c50207cac5b30e590e0784c8d2f68ceb86f37658d30a8fe67ac19faf992"
        );
    }

    #[test]
    fn run_hash_on_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"b": 2, "a": 1}"#).unwrap();
        let args = HashArgs {
            file: Some(path),
            show_canonical: true,
        };
        assert_eq!(run_hash(&args, &StampConfig::default()).unwrap(), 0);
    }
}
