//! # cstamp-cli: Command-Line Interface
//!
//! Provides the `cstamp` binary.
//!
//! ## Subcommands
//!
//! - `cstamp keygen`: Ed25519 key pair files, random or password-derived.
//! - `cstamp stamp`: build, sign and encode a stamp token.
//! - `cstamp verify`: decode and verify a token (`OK` / `FAIL`).
//! - `cstamp decode`: print a token's head and envelope.
//! - `cstamp hash`: canonical digest of a JSON document.
//!
//! ```bash
//! cstamp keygen --prefix alice
//! cstamp stamp --type auth --holder host1 --key alice.key > token.txt
//! cstamp verify "$(cat token.txt)" --pubkey alice.pub
//! ```

pub mod inspect;
pub mod keys;
pub mod stamp;
pub mod verify;

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use cstamp::StampConfig;

/// Load a YAML stamp configuration, or the defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> Result<StampConfig> {
    let Some(path) = path else {
        return Ok(StampConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    let config = StampConfig::from_yaml_str(&text)
        .with_context(|| format!("failed to parse config: {}", path.display()))?;
    tracing::debug!(path = %path.display(), digest = %config.digest, "loaded config");
    Ok(config)
}

/// Read a file, or standard input when `path` is `None` or `-`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            Ok(text)
        }
    }
}

/// Parse a JSON document from a file or standard input.
pub fn read_json(path: Option<&Path>) -> Result<serde_json::Value> {
    let text = read_input(path)?;
    let source = path.map_or("<stdin>".into(), |p| p.display().to_string());
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON: {source}"))
}

/// A token argument, read from standard input when given as `-`.
pub fn token_arg(token: &str) -> Result<String> {
    if token == "-" {
        return Ok(read_input(None)?.trim().to_string());
    }
    Ok(token.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstamp::EnvelopeMode;
    use cstamp_core::DigestAlgorithm;

    #[test]
    fn load_config_defaults_without_path() {
        assert_eq!(load_config(None).unwrap(), StampConfig::default());
    }

    #[test]
    fn load_config_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cstamp.yaml");
        std::fs::write(&path, "digest: keccak256\nmode: full\n").unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.digest, DigestAlgorithm::Keccak256);
        assert_eq!(config.mode, EnvelopeMode::Full);
    }

    #[test]
    fn load_config_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "digest: md5\n").unwrap();

        let err = load_config(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("bad.yaml"));
    }

    #[test]
    fn read_json_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.json");
        std::fs::write(&path, r#"{"b": 1, "a": 2}"#).unwrap();
        assert_eq!(read_json(Some(&path)).unwrap(), serde_json::json!({"a": 2, "b": 1}));
    }

    #[test]
    fn token_arg_trims() {
        assert_eq!(token_arg("  abc.def\n").unwrap(), "abc.def");
    }
}
