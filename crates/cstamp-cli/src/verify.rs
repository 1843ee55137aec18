//! # Verify Subcommand
//!
//! `cstamp verify <TOKEN> [--pubkey FILE]`
//!
//! Prints `OK` and exits 0 for a valid stamp, `FAIL` and exits 1 otherwise.
//! Without `--pubkey` the key named inside the token is used, which proves
//! integrity but not who signed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use cstamp::{decode_token, verify_stamp, StampConfig};
use cstamp_crypto::Ed25519Verifier;

use crate::keys::load_public_key;

/// Arguments for `cstamp verify`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// The token (`-` reads it from stdin).
    #[arg(value_name = "TOKEN")]
    pub token: String,

    /// Only accept signatures by this public key (hex file).
    #[arg(long, value_name = "FILE")]
    pub pubkey: Option<PathBuf>,
}

/// Execute `cstamp verify`.
pub async fn run_verify(args: &VerifyArgs, config: &StampConfig) -> Result<u8> {
    let token = crate::token_arg(&args.token)?;
    if check_token(&token, args.pubkey.as_deref(), config).await? {
        println!("OK");
        Ok(0)
    } else {
        println!("FAIL");
        Ok(1)
    }
}

/// Decode and verify a token with the Ed25519 verifier.
pub async fn check_token(
    token: &str,
    pubkey: Option<&std::path::Path>,
    config: &StampConfig,
) -> Result<bool> {
    let verifier = match pubkey {
        Some(path) => Ed25519Verifier::pinned(load_public_key(path)?),
        None => Ed25519Verifier::new(),
    };
    let envelope = decode_token(token).context("failed to decode token")?;
    let ok = verify_stamp(&envelope, &verifier, config)
        .await
        .context("verification could not be completed")?;
    tracing::info!(stamp_type = envelope.stamp_type(), ok, "verified token");
    Ok(ok)
}
