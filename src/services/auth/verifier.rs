use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

/// Why a bearer token was rejected locally.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("no signing secret configured")]
    MissingSecret,
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

/// Local signature check for HMAC-signed access tokens.
///
/// This is a cheap pre-filter in front of the backend lookup. A token that
/// passes here is still only a credential: the backend decides who it belongs
/// to (and whether it was revoked).
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct TokenVerifier {
    decoding_key: Option<DecodingKey>,
    validation: Validation,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier")
            .field("has_secret", &self.decoding_key.is_some())
            .field("leeway", &self.validation.leeway)
            .finish()
    }
}

impl TokenVerifier {
    /// `secret = None` (or an empty secret) builds a verifier that rejects everything.
    pub fn new(secret: Option<&SecretString>, leeway_seconds: u64) -> Self {
        let decoding_key = secret
            .map(|s| s.expose_secret())
            .filter(|s| !s.is_empty())
            .map(|s| DecodingKey::from_secret(s.as_bytes()));

        let mut validation = Validation::new(Algorithm::HS256);
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        // exp/nbf are enforced when the token carries them, but nothing is mandatory.
        validation.required_spec_claims.clear();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        // Audience/issuer belong to the backend's judgement.
        validation.validate_aud = false;
        validation.leeway = leeway_seconds;

        Self {
            decoding_key,
            validation,
        }
    }

    pub fn has_secret(&self) -> bool {
        self.decoding_key.is_some()
    }

    /// Verify signature and time-based claims. No claims are handed back.
    pub fn verify(&self, token: &str) -> Result<(), VerifyError> {
        let key = self.decoding_key.as_ref().ok_or(VerifyError::MissingSecret)?;
        jsonwebtoken::decode::<serde_json::Value>(token, key, &self.validation)?;
        Ok(())
    }

    /// Boolean view of [`verify`](Self::verify). Every failure is `false`.
    pub fn is_valid(&self, token: &str) -> bool {
        self.verify(token).is_ok()
    }
}
