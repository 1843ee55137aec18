//! # Wire Encodings
//!
//! Hex for digests, keys and signatures; unpadded base64url for token halves.
//!
//! Base64url decoding accepts input with or without `=` padding. Encoding
//! never emits padding.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::error::CoreError;

const BASE64URL: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encode bytes as unpadded base64url (`-`/`_` alphabet).
pub fn to_base64url(bytes: &[u8]) -> String {
    BASE64URL.encode(bytes)
}

/// Decode base64url, tolerating trailing padding.
pub fn from_base64url(input: &str) -> Result<Vec<u8>, CoreError> {
    BASE64URL
        .decode(input)
        .map_err(|e| CoreError::Decoding(format!("invalid base64url: {e}")))
}

/// Render bytes as a lowercase hex string.
pub fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (either case, surrounding whitespace ignored).
pub fn from_hex(hex: &str) -> Result<Vec<u8>, CoreError> {
    let hex = hex.trim();
    if hex.len() % 2 != 0 {
        return Err(CoreError::Decoding(format!(
            "hex string has odd length: {}",
            hex.len()
        )));
    }
    if !hex.is_ascii() {
        return Err(CoreError::Decoding("hex string contains non-ASCII characters".to_string()));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| CoreError::Decoding(format!("invalid hex at position {i}: {e}")))
        })
        .collect()
}
