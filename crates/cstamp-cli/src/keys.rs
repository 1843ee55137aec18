//! # Key Subcommand and Key Loading
//!
//! `cstamp keygen` writes `<prefix>.key` (hex seed) and `<prefix>.pub`
//! (hex public key). With `--from-password USER` the seed is derived from
//! the user name and the password in `CSTAMP_PASSWORD` instead of drawn
//! from the OS CSPRNG.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use cstamp_crypto::{
    kdf, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signer, EnvKeyProvider, LocalKeyProvider,
    SIGNING_KEY_ENV,
};

/// Environment variable holding the password for `--from-password`.
pub const PASSWORD_ENV: &str = "CSTAMP_PASSWORD";

/// Arguments for `cstamp keygen`.
#[derive(Args, Debug)]
pub struct KeygenArgs {
    /// Output directory for the key files.
    #[arg(long, short, default_value = ".")]
    pub output: PathBuf,

    /// Prefix for the key file names.
    #[arg(long, default_value = "cstamp")]
    pub prefix: String,

    /// Derive the key from USER and the password in CSTAMP_PASSWORD.
    #[arg(long, value_name = "USER")]
    pub from_password: Option<String>,
}

/// Execute `cstamp keygen`.
pub fn run_keygen(args: &KeygenArgs) -> Result<u8> {
    let pair = match &args.from_password {
        Some(user) => {
            let password = std::env::var(PASSWORD_ENV)
                .with_context(|| format!("{PASSWORD_ENV} must be set with --from-password"))?;
            kdf::keypair_from_credentials(user, &password)
        }
        None => Ed25519KeyPair::generate(),
    };
    let (key_path, pub_path) = write_keypair(&pair, &args.output, &args.prefix)?;

    println!("OK: generated Ed25519 keypair");
    println!("  Private key: {}", key_path.display());
    println!("  Public key:  {}", pub_path.display());
    println!("  Public key (hex): {}", pair.public_key());
    Ok(0)
}

/// Write `<prefix>.key` and `<prefix>.pub` into `dir`.
pub fn write_keypair(
    pair: &Ed25519KeyPair,
    dir: &Path,
    prefix: &str,
) -> Result<(PathBuf, PathBuf)> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;

    let key_path = dir.join(format!("{prefix}.key"));
    let pub_path = dir.join(format!("{prefix}.pub"));

    std::fs::write(&key_path, pair.seed_hex().as_bytes())
        .with_context(|| format!("failed to write private key: {}", key_path.display()))?;
    restrict_permissions(&key_path)?;
    std::fs::write(&pub_path, pair.public_key().to_hex())
        .with_context(|| format!("failed to write public key: {}", pub_path.display()))?;

    tracing::info!(key = %key_path.display(), "wrote key pair");
    Ok((key_path, pub_path))
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict permissions: {}", path.display()))
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

/// Signer from a key file, falling back to `CSTAMP_SIGNING_KEY`.
pub fn load_signer(key: Option<&Path>) -> Result<Ed25519Signer> {
    if let Some(path) = key {
        if !path.exists() {
            bail!("private key file not found: {}", path.display());
        }
        let hex = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read private key: {}", path.display()))?;
        let provider = LocalKeyProvider::from_seed_hex(&hex)
            .with_context(|| format!("invalid private key: {}", path.display()))?;
        return Ok(Ed25519Signer::new(Arc::new(provider)));
    }

    let provider = EnvKeyProvider::from_default_env()
        .with_context(|| format!("no --key given and {SIGNING_KEY_ENV} is not usable"))?;
    Ok(Ed25519Signer::new(Arc::new(provider)))
}

/// Read a hex public key file.
pub fn load_public_key(path: &Path) -> Result<Ed25519PublicKey> {
    if !path.exists() {
        bail!("public key file not found: {}", path.display());
    }
    let hex = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read public key: {}", path.display()))?;
    Ed25519PublicKey::from_hex(&hex)
        .with_context(|| format!("invalid public key: {}", path.display()))
}
