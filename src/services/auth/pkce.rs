//! PKCE (RFC 7636) helpers for the email flows (sign-up confirmation, password
//! recovery). The verifier stays with the browser in a cookie; only the S256
//! challenge goes to the backend. `/auth/callback` later trades the emailed
//! code plus the verifier for a session.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::Rng;
use secrecy::SecretString;
use sha2::{Digest, Sha256};

const VERIFIER_LEN: usize = 64;
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// What the backend gets to see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkceChallenge {
    pub challenge: String,
    pub method: &'static str,
}

#[derive(Debug)]
pub struct PkcePair {
    verifier: SecretString,
    challenge: PkceChallenge,
}

impl PkcePair {
    pub fn generate() -> Self {
        let mut rng = rand::rng();
        let verifier: String = (0..VERIFIER_LEN)
            .map(|_| UNRESERVED[rng.random_range(0..UNRESERVED.len())] as char)
            .collect();

        let challenge = PkceChallenge {
            challenge: s256(&verifier),
            method: "s256",
        };

        Self {
            verifier: SecretString::from(verifier),
            challenge,
        }
    }

    pub fn verifier(&self) -> &SecretString {
        &self.verifier
    }

    pub fn challenge(&self) -> &PkceChallenge {
        &self.challenge
    }
}

/// `BASE64URL(SHA256(verifier))` without padding.
pub fn s256(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}
