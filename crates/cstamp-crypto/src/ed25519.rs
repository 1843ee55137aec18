//! # Ed25519 Signing and Verification
//!
//! Ed25519 key types plus the [`Ed25519Signer`] / [`Ed25519Verifier`]
//! capabilities used to seal and check stamps.
//!
//! ## Security Invariant
//!
//! - Signing input is `&ContentDigest`. Raw bytes cannot be signed. Every
//!   signature covers a metadata digest computed from `CanonicalBytes`.
//! - Private keys are never serialized or logged. `Ed25519KeyPair` does not
//!   implement `Serialize` and its `Debug` output is redacted.
//! - The verifier never errors on untrusted input: unknown algorithms,
//!   malformed keys and malformed signatures are all `Ok(false)`.
//!
//! ## Wire Form
//!
//! The signer emits `{"alg":"ed25519","signer":<pubkey hex>,"signature":<sig hex>}`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use cstamp_core::encoding::{from_hex, to_hex};
use cstamp_core::{CapabilityError, ContentDigest, SignatureBlock, Signer, Verifier};
use ed25519_dalek::{Signer as _, Verifier as _};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::Zeroizing;

use crate::error::CryptoError;
use crate::key_provider::{KeyProvider, LocalKeyProvider};

/// Algorithm identifier carried in [`SignatureBlock::alg`].
pub const ED25519_ALG: &str = "ed25519";

/// Fixed-width byte newtype rendered as lowercase hex on the wire and in
/// `Display`. `Debug` shows only the first four bytes.
macro_rules! hex_bytes {
    ($(#[$meta:meta])* $name:ident, $len:literal, $err:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub fn from_bytes(bytes: [u8; $len]) -> Self {
                Self(bytes)
            }

            pub fn as_bytes(&self) -> &[u8; $len] {
                &self.0
            }

            pub fn to_hex(&self) -> String {
                to_hex(&self.0)
            }

            /// Parse from hex; the decoded length must be exact.
            pub fn from_hex(text: &str) -> Result<Self, CryptoError> {
                let raw = from_hex(text)?;
                let n = raw.len();
                <[u8; $len]>::try_from(raw)
                    .map(Self)
                    .map_err(|_| CryptoError::$err(format!("want {} bytes, have {n}", $len)))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
                s.collect_str(self)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
                let text = <std::borrow::Cow<'de, str>>::deserialize(d)?;
                Self::from_hex(&text).map_err(serde::de::Error::custom)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({}..)"), to_hex(&self.0[..4]))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.to_hex())
            }
        }
    };
}

hex_bytes!(
    /// Ed25519 verifying key, 32 bytes.
    Ed25519PublicKey,
    32,
    InvalidPublicKey
);

hex_bytes!(
    /// Ed25519 signature, 64 bytes.
    Ed25519Signature,
    64,
    InvalidSignature
);

impl Ed25519PublicKey {
    /// The dalek key; fails for byte strings that are not curve points.
    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::InvalidPublicKey(e.to_string()))
    }
}

/// Signing half held in memory. No `Serialize`; `Debug` is redacted and
/// dalek zeroizes the seed on drop.
pub struct Ed25519KeyPair {
    signing_key: ed25519_dalek::SigningKey,
}

// ---------------------------------------------------------------------------
// Ed25519KeyPair impls
// ---------------------------------------------------------------------------

impl Ed25519KeyPair {
    /// Generate a new random Ed25519 key pair.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        let signing_key = ed25519_dalek::SigningKey::generate(&mut csprng);
        Self { signing_key }
    }

    /// Create a key pair from raw 32-byte private key seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = ed25519_dalek::SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Get the public key from this key pair.
    pub fn public_key(&self) -> Ed25519PublicKey {
        Ed25519PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Export the 32-byte seed as hex, for writing key files. The buffer is
    /// wiped on drop.
    pub fn seed_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(to_hex(self.signing_key.as_bytes()))
    }

    /// Sign a digest. The message is the 32 raw digest bytes.
    pub fn sign(&self, digest: &ContentDigest) -> Ed25519Signature {
        let sig = self.signing_key.sign(digest.as_bytes());
        Ed25519Signature(sig.to_bytes())
    }
}

impl fmt::Debug for Ed25519KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Ed25519KeyPair(<private>)")
    }
}

/// Verify an Ed25519 signature over a digest.
pub fn verify_digest(
    digest: &ContentDigest,
    signature: &Ed25519Signature,
    public_key: &Ed25519PublicKey,
) -> Result<(), CryptoError> {
    let vk = public_key.to_verifying_key()?;
    let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
    vk.verify(digest.as_bytes(), &sig)
        .map_err(|e| CryptoError::InvalidSignature(e.to_string()))
}

// ---------------------------------------------------------------------------
// Capabilities
// ---------------------------------------------------------------------------

/// [`Signer`] capability backed by any [`KeyProvider`].
#[derive(Clone)]
pub struct Ed25519Signer {
    provider: Arc<dyn KeyProvider>,
}

impl Ed25519Signer {
    /// Wrap a key provider.
    pub fn new(provider: Arc<dyn KeyProvider>) -> Self {
        Self { provider }
    }

    /// In-memory signer from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self::new(Arc::new(LocalKeyProvider::from_seed(seed)))
    }

    /// In-memory signer with a fresh random key.
    pub fn generate() -> Self {
        Self::new(Arc::new(LocalKeyProvider::generate()))
    }

    /// Public key of the underlying provider.
    pub fn public_key(&self) -> Result<Ed25519PublicKey, CryptoError> {
        self.provider.public_key()
    }
}

impl fmt::Debug for Ed25519Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ed25519Signer")
            .field("provider", &self.provider.provider_name())
            .finish()
    }
}

#[async_trait]
impl Signer for Ed25519Signer {
    async fn sign(&self, digest: &ContentDigest) -> Result<SignatureBlock, CapabilityError> {
        let signature = self.provider.sign(digest)?;
        let public_key = self.provider.public_key()?;
        tracing::trace!(
            provider = self.provider.provider_name(),
            signer = %public_key,
            "signed metadata digest"
        );
        Ok(SignatureBlock::new(
            ED25519_ALG,
            Some(public_key.to_hex()),
            signature.to_hex(),
        ))
    }
}

/// [`Verifier`] capability for `ed25519` signature blocks.
///
/// Unpinned, it checks the signature against the key named in the block's
/// `signer` field, which proves integrity but not identity. Pinned to a
/// trusted key, a block naming any other key is rejected.
#[derive(Debug, Clone, Default)]
pub struct Ed25519Verifier {
    trusted: Option<Ed25519PublicKey>,
}

impl Ed25519Verifier {
    /// Verifier that trusts the key named in each block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Verifier that only accepts signatures by `key`.
    pub fn pinned(key: Ed25519PublicKey) -> Self {
        Self { trusted: Some(key) }
    }

    fn resolve_key(&self, block: &SignatureBlock) -> Option<Ed25519PublicKey> {
        let claimed = match block.signer.as_deref() {
            Some(hex) => Some(Ed25519PublicKey::from_hex(hex).ok()?),
            None => None,
        };
        match (&self.trusted, claimed) {
            (Some(trusted), Some(claimed)) if *trusted != claimed => None,
            (Some(trusted), _) => Some(trusted.clone()),
            (None, claimed) => claimed,
        }
    }
}

#[async_trait]
impl Verifier for Ed25519Verifier {
    async fn verify(
        &self,
        digest: &ContentDigest,
        block: &SignatureBlock,
    ) -> Result<bool, CapabilityError> {
        if block.alg != ED25519_ALG {
            tracing::debug!(alg = %block.alg, "unrecognized signature algorithm");
            return Ok(false);
        }
        let Some(public_key) = self.resolve_key(block) else {
            tracing::debug!("signer key missing, malformed, or not trusted");
            return Ok(false);
        };
        let Ok(signature) = Ed25519Signature::from_hex(&block.signature) else {
            tracing::debug!("malformed signature encoding");
            return Ok(false);
        };
        Ok(verify_digest(digest, &signature, &public_key).is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cstamp_core::DigestAlgorithm;

    fn digest(data: &[u8]) -> ContentDigest {
        DigestAlgorithm::default().digest_bytes(data).unwrap()
    }

    #[test]
    fn test_zero_seed_public_key() {
        let kp = Ed25519KeyPair::from_seed(&[0u8; 32]);
        assert_eq!(
            kp.public_key().to_hex(),
            "3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29"
        );
    }

    #[test]
    fn test_sign_and_verify_digest() {
        let kp = Ed25519KeyPair::generate();
        let d = digest(b"hello");
        let sig = kp.sign(&d);
        verify_digest(&d, &sig, &kp.public_key()).expect("valid signature should verify");
    }

    #[test]
    fn test_verify_wrong_digest_fails() {
        let kp = Ed25519KeyPair::generate();
        let sig = kp.sign(&digest(b"original"));
        assert!(verify_digest(&digest(b"tampered"), &sig, &kp.public_key()).is_err());
    }

    #[test]
    fn test_deterministic_from_seed() {
        let seed = [42u8; 32];
        let kp1 = Ed25519KeyPair::from_seed(&seed);
        let kp2 = Ed25519KeyPair::from_seed(&seed);
        assert_eq!(kp1.public_key(), kp2.public_key());
        assert_eq!(kp1.sign(&digest(b"x")), kp2.sign(&digest(b"x")));
        assert_eq!(*kp1.seed_hex(), "2a".repeat(32));
    }

    #[test]
    fn test_public_key_serde_json_roundtrip() {
        let pk = Ed25519KeyPair::generate().public_key();
        let json = serde_json::to_string(&pk).unwrap();
        assert_eq!(json.len(), 64 + 2);
        let pk2: Ed25519PublicKey = serde_json::from_str(&json).unwrap();
        assert_eq!(pk, pk2);
    }

    #[test]
    fn test_signature_hex_roundtrip() {
        let sig = Ed25519KeyPair::generate().sign(&digest(b"y"));
        let hex = sig.to_hex();
        assert_eq!(hex.len(), 128);
        assert_eq!(Ed25519Signature::from_hex(&hex).unwrap(), sig);
    }

    #[test]
    fn test_invalid_hex_rejected() {
        assert!(Ed25519PublicKey::from_hex("not-hex").is_err());
        assert!(Ed25519PublicKey::from_hex("aabb").is_err());
        assert!(Ed25519Signature::from_hex("aabb").is_err());
    }

    #[test]
    fn test_debug_does_not_leak_private_key() {
        let kp = Ed25519KeyPair::generate();
        assert_eq!(format!("{kp:?}"), "Ed25519KeyPair(<private>)");
        let signer = Ed25519Signer::generate();
        assert!(format!("{signer:?}").contains("LocalKeyProvider"));
    }

    // ---- capabilities ----

    #[tokio::test]
    async fn signer_emits_ed25519_block() {
        let signer = Ed25519Signer::from_seed(&[0u8; 32]);
        let block = signer.sign(&digest(b"")).await.unwrap();
        assert_eq!(block.alg, "ed25519");
        assert_eq!(
            block.signer.as_deref(),
            Some("3b6a27bcceb6a42d62a3a8d02a6f0d73653215771de243a63ac048a18b59da29")
        );
        assert_eq!(block.signature.len(), 128);
        assert!(block.extensions.is_empty());
    }

    #[tokio::test]
    async fn verifier_accepts_matching_signature() {
        let signer = Ed25519Signer::generate();
        let d = digest(b"payload");
        let block = signer.sign(&d).await.unwrap();
        assert!(Ed25519Verifier::new().verify(&d, &block).await.unwrap());
    }

    #[tokio::test]
    async fn verifier_rejects_unknown_algorithm_without_error() {
        let signer = Ed25519Signer::generate();
        let d = digest(b"payload");
        let mut block = signer.sign(&d).await.unwrap();
        block.alg = "rsa".to_string();
        assert!(!Ed25519Verifier::new().verify(&d, &block).await.unwrap());
    }

    #[tokio::test]
    async fn verifier_rejects_malformed_fields_without_error() {
        let signer = Ed25519Signer::generate();
        let d = digest(b"payload");
        let block = signer.sign(&d).await.unwrap();
        let verifier = Ed25519Verifier::new();

        let mut no_signer = block.clone();
        no_signer.signer = None;
        assert!(!verifier.verify(&d, &no_signer).await.unwrap());

        let mut bad_key = block.clone();
        bad_key.signer = Some("zz".to_string());
        assert!(!verifier.verify(&d, &bad_key).await.unwrap());

        let mut bad_sig = block;
        bad_sig.signature = "abcd".to_string();
        assert!(!verifier.verify(&d, &bad_sig).await.unwrap());
    }

    #[tokio::test]
    async fn pinned_verifier_rejects_other_keys() {
        let trusted = Ed25519Signer::generate();
        let stranger = Ed25519Signer::generate();
        let d = digest(b"payload");
        let verifier = Ed25519Verifier::pinned(trusted.public_key().unwrap());

        let good = trusted.sign(&d).await.unwrap();
        assert!(verifier.verify(&d, &good).await.unwrap());

        let foreign = stranger.sign(&d).await.unwrap();
        assert!(!verifier.verify(&d, &foreign).await.unwrap());

        // A pinned verifier does not need the block to name the key.
        let mut anonymous = good;
        anonymous.signer = None;
        assert!(verifier.verify(&d, &anonymous).await.unwrap());
    }
}
