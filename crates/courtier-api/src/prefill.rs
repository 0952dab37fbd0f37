//! Signed prefill tokens
//!
//! Links sent to known prospects carry an HS256 token whose claims fill the
//! identity fields of the form.

use courtier_core::PrefillClaims;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrefillError {
    #[error("prefill tokens are not accepted")]
    NotConfigured,

    #[error("invalid prefill token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),
}

#[derive(Deserialize)]
struct TokenClaims {
    #[serde(flatten)]
    prefill: PrefillClaims,
    #[allow(dead_code)]
    exp: usize,
}

#[derive(Clone)]
pub struct PrefillVerifier {
    key: Option<DecodingKey>,
    validation: Validation,
}

impl PrefillVerifier {
    pub fn new(secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);
        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    pub fn disabled() -> Self {
        Self::new(None)
    }

    pub fn verify(&self, token: &str) -> Result<PrefillClaims, PrefillError> {
        let key = self.key.as_ref().ok_or(PrefillError::NotConfigured)?;
        let data = decode::<TokenClaims>(token, key, &self.validation)?;
        Ok(data.claims.prefill)
    }
}
