//! # Token Codec
//!
//! Compact text form of a [`StampEnvelope`]:
//!
//! ```text
//! base64url(JSON(head)) "." base64url(JSON(envelope))
//! ```
//!
//! with head `{"type":"cryptostamp","version":"1.0"}`. Both halves use the
//! URL-safe alphabet without padding. Decoding checks structure only; it
//! never verifies the signature.

use cstamp_core::encoding::{from_base64url, to_base64url};
use serde::{Deserialize, Deserializer, Serialize};

use crate::envelope::StampEnvelope;
use crate::error::TokenError;

/// Type marker every token head must carry.
pub const TOKEN_TYPE: &str = "cryptostamp";

/// Version written by [`encode_token`].
pub const PROTOCOL_VERSION: &str = "1.0";

const HEAD_ERROR: &str = "invalid token head";
const BODY_ERROR: &str = "invalid token body";

/// First half of a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenHead {
    #[serde(rename = "type")]
    pub token_type: String,

    /// Protocol revision. Older emitters wrote it as `ver`, sometimes as a
    /// JSON number; both are read back as text. Empty when the head carried
    /// no version at all.
    #[serde(alias = "ver", default, deserialize_with = "version_text")]
    pub version: String,
}

impl TokenHead {
    /// Head for a given protocol version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            token_type: TOKEN_TYPE.to_string(),
            version: version.into(),
        }
    }
}

impl Default for TokenHead {
    fn default() -> Self {
        Self::new(PROTOCOL_VERSION)
    }
}

fn version_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Version {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Version::deserialize(d)? {
        Version::Text(s) => s,
        Version::Number(n) => n.to_string(),
    })
}

/// Encode an envelope with the current protocol head.
pub fn encode_token(envelope: &StampEnvelope) -> Result<String, TokenError> {
    encode_token_with_head(&TokenHead::default(), envelope)
}

/// Encode an envelope under a caller-supplied head.
pub fn encode_token_with_head(
    head: &TokenHead,
    envelope: &StampEnvelope,
) -> Result<String, TokenError> {
    let head = serde_json::to_vec(head)?;
    let body = serde_json::to_vec(envelope)?;
    Ok(format!("{}.{}", to_base64url(&head), to_base64url(&body)))
}

/// Decode a token into its envelope.
///
/// # Errors
///
/// `TokenError::Format` if the head is not valid base64url JSON with
/// `type == "cryptostamp"`, or the body is not a valid envelope.
pub fn decode_token(token: &str) -> Result<StampEnvelope, TokenError> {
    decode_token_with_head(token).map(|(_, envelope)| envelope)
}

/// Decode a token, also returning its head.
pub fn decode_token_with_head(token: &str) -> Result<(TokenHead, StampEnvelope), TokenError> {
    let token = token.trim();
    let Some((head, body)) = token.split_once('.') else {
        return Err(TokenError::Format(HEAD_ERROR.to_string()));
    };

    let head: TokenHead = from_base64url(head)
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .filter(|head: &TokenHead| head.token_type == TOKEN_TYPE)
        .ok_or_else(|| TokenError::Format(HEAD_ERROR.to_string()))?;

    let bytes = from_base64url(body).map_err(|e| TokenError::Format(format!("{BODY_ERROR}: {e}")))?;
    let envelope: StampEnvelope = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Format(format!("{BODY_ERROR}: {e}")))?;

    tracing::debug!(
        version = %head.version,
        stamp_type = envelope.stamp_type(),
        "decoded token"
    );
    Ok((head, envelope))
}

#[cfg(test)]
mod tests {
    use super::*;

    const ENVELOPE_JSON: &str = concat!(
        r#"{"type":"auth","date":"1970-01-01T00:00:00.000Z","payload":{},"#,
        r#""payloadHash":"c0ad1c50207cac5b30e590e0784c8d2f68ceb86f37658d30a8fe67ac19faf992","#,
        r#""signature":{"alg":"test","signature":"00"}}"#
    );

    fn b64(s: &str) -> String {
        to_base64url(s.as_bytes())
    }

    fn envelope() -> StampEnvelope {
        serde_json::from_str(ENVELOPE_JSON).unwrap()
    }

    fn format_message(token: &str) -> String {
        match decode_token(token) {
            Err(TokenError::Format(msg)) => msg,
            Err(other) => panic!("expected a format error, got {other}"),
            Ok(_) => panic!("expected {token:?} to be rejected"),
        }
    }

    #[test]
    fn head_encoding_is_fixed() {
        let token = encode_token(&envelope()).unwrap();
        let (head, _) = token.split_once('.').unwrap();
        assert_eq!(head, "eyJ0eXBlIjoiY3J5cHRvc3RhbXAiLCJ2ZXJzaW9uIjoiMS4wIn0");
        assert!(!token.contains('='));
    }

    #[test]
    fn encode_decode_preserves_envelope() {
        let env = envelope();
        let (head, back) = decode_token_with_head(&encode_token(&env).unwrap()).unwrap();
        assert_eq!(back, env);
        assert_eq!(head, TokenHead::default());
        assert_eq!(back.date().to_iso8601(), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn custom_head_version() {
        let token = encode_token_with_head(&TokenHead::new("0.4"), &envelope()).unwrap();
        let (head, _) = decode_token_with_head(&token).unwrap();
        assert_eq!(head.version, "0.4");
    }

    #[test]
    fn legacy_numeric_ver_key_is_accepted() {
        let token = format!(
            "{}.{}",
            b64(r#"{"type":"cryptostamp","ver":0.4}"#),
            b64(ENVELOPE_JSON)
        );
        let (head, env) = decode_token_with_head(&token).unwrap();
        assert_eq!(head.version, "0.4");
        assert_eq!(env, envelope());
    }

    #[test]
    fn head_without_version_is_accepted() {
        let token = format!("{}.{}", b64(r#"{"type":"cryptostamp"}"#), b64(ENVELOPE_JSON));
        let (head, env) = decode_token_with_head(&token).unwrap();
        assert_eq!(head.token_type, TOKEN_TYPE);
        assert!(head.version.is_empty());
        assert_eq!(env, envelope());
    }

    #[test]
    fn padded_halves_are_accepted() {
        let token = encode_token(&envelope()).unwrap();
        let (head, body) = token.split_once('.').unwrap();
        let padded = format!("{head}=.{body}");
        assert!(decode_token(&padded).is_ok());
    }

    #[test]
    fn wrong_marker_and_bad_head_share_a_message() {
        let body = b64(ENVELOPE_JSON);
        let wrong_type = format!("{}.{body}", b64(r#"{"type":"otherstamp","version":"0.4"}"#));
        let not_json = format!("{}.{body}", b64("not json"));
        let not_base64 = format!("***.{body}");

        let msg = format_message(&wrong_type);
        assert_eq!(msg, HEAD_ERROR);
        assert_eq!(format_message(&not_json), msg);
        assert_eq!(format_message(&not_base64), msg);
    }

    #[test]
    fn missing_separator_is_a_head_failure() {
        assert_eq!(format_message(&b64(ENVELOPE_JSON)), HEAD_ERROR);
        assert_eq!(format_message(""), HEAD_ERROR);
    }

    #[test]
    fn bad_body_is_a_body_failure() {
        let head = b64(r#"{"type":"cryptostamp","version":"1.0"}"#);
        for body in [b64("{"), b64(r#"{"type":"auth"}"#), "%%%".to_string()] {
            let msg = format_message(&format!("{head}.{body}"));
            assert!(msg.starts_with(BODY_ERROR), "unexpected message {msg:?}");
        }
    }

    #[test]
    fn body_with_unparseable_date_is_rejected() {
        let head = b64(r#"{"type":"cryptostamp","version":"1.0"}"#);
        let body = b64(&ENVELOPE_JSON.replace("1970-01-01T00:00:00.000Z", "yesterday"));
        assert!(format_message(&format!("{head}.{body}")).starts_with(BODY_ERROR));
    }
}
