//! # Stamper
//!
//! A configured stamping service: one [`StampConfig`], an optional signer
//! and a verifier, fixed at construction. Cloning is cheap and clones share
//! the capabilities, so one instance can serve concurrent tasks.
//!
//! A stamper without a signer is verify-only; [`Stamper::stamp`] then fails
//! with [`StampError::MissingKey`].

use std::sync::Arc;

use cstamp_core::{Signer, Verifier};

use crate::builder::{create_stamp, StampParams};
use crate::config::StampConfig;
use crate::envelope::StampEnvelope;
use crate::error::{StampError, StamperError};
use crate::token::{decode_token, encode_token_with_head, TokenHead};
use crate::verify::verify_stamp;

#[derive(Clone)]
pub struct Stamper {
    config: StampConfig,
    signer: Option<Arc<dyn Signer>>,
    verifier: Arc<dyn Verifier>,
}

impl Stamper {
    /// Verify-only stamper.
    pub fn new(config: StampConfig, verifier: Arc<dyn Verifier>) -> Self {
        Self {
            config,
            signer: None,
            verifier,
        }
    }

    /// Attach a signer.
    pub fn with_signer(mut self, signer: Arc<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn config(&self) -> &StampConfig {
        &self.config
    }

    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }

    pub async fn stamp(&self, params: StampParams) -> Result<StampEnvelope, StampError> {
        let signer = self.signer.as_deref().ok_or(StampError::MissingKey)?;
        create_stamp(params, signer, &self.config).await
    }

    /// Stamp and encode with the current protocol head.
    pub async fn token(&self, params: StampParams) -> Result<String, StamperError> {
        self.token_with_head(&TokenHead::default(), params).await
    }

    /// Stamp and encode under a caller-supplied head.
    pub async fn token_with_head(
        &self,
        head: &TokenHead,
        params: StampParams,
    ) -> Result<String, StamperError> {
        let envelope = self.stamp(params).await?;
        Ok(encode_token_with_head(head, &envelope)?)
    }

    pub async fn verify(&self, envelope: &StampEnvelope) -> Result<bool, StampError> {
        verify_stamp(envelope, self.verifier.as_ref(), &self.config).await
    }

    /// Decode and verify a token.
    ///
    /// A malformed token is an error, not `false`.
    pub async fn verify_token(&self, token: &str) -> Result<bool, StamperError> {
        let envelope = decode_token(token)?;
        Ok(self.verify(&envelope).await?)
    }
}

impl std::fmt::Debug for Stamper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stamper")
            .field("config", &self.config)
            .field("can_sign", &self.can_sign())
            .finish()
    }
}
