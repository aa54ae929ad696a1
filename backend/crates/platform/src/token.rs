//! Signed, time-bound tokens
//!
//! Compact JWTs (HS256) whose claims are `{data, iat, exp}`. The payload type
//! is chosen by the caller and decoded once into a typed struct.
//!
//! Only HS256 is accepted on verification. A token signed with any other
//! algorithm, even with the same secret, is reported as
//! [`TokenError::InvalidSignature`].

use std::fmt;
use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token has expired")]
    Expired,

    #[error("token signature or algorithm does not match")]
    InvalidSignature,

    #[error("token is malformed")]
    Malformed,

    #[error("failed to sign token: {0}")]
    Signing(String),
}

/// Claims envelope shared by every token the service issues
#[derive(Debug, Serialize, serde::Deserialize)]
pub struct TokenClaims<T> {
    pub data: T,
    pub iat: i64,
    pub exp: i64,
}

/// トークンの発行と検証
///
/// 署名鍵は起動時に一度だけ構築し、以降は読み取り専用で共有する。
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    usable: bool,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            usable: !secret.is_empty(),
        }
    }

    /// Issue a token valid for `ttl` from now.
    pub fn issue<T: Serialize>(&self, ttl: Duration, payload: &T) -> Result<String, TokenError> {
        self.issue_at(Utc::now().timestamp(), ttl, payload)
    }

    /// Issue a token as if the current unix time were `now`.
    pub fn issue_at<T: Serialize>(
        &self,
        now: i64,
        ttl: Duration,
        payload: &T,
    ) -> Result<String, TokenError> {
        if !self.usable {
            return Err(TokenError::Signing("signing secret is empty".into()));
        }

        let ttl_secs = i64::try_from(ttl.as_secs())
            .map_err(|_| TokenError::Signing("ttl out of range".into()))?;
        let claims = TokenClaims {
            data: payload,
            iat: now,
            exp: now.saturating_add(ttl_secs),
        };

        jsonwebtoken::encode(&Header::new(ALGORITHM), &claims, &self.encoding)
            .map_err(|e| TokenError::Signing(e.to_string()))
    }

    /// Verify a token and return its payload.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, TokenError> {
        self.verify_at(Utc::now().timestamp(), token)
    }

    /// Verify a token against an explicit clock.
    ///
    /// Signature is checked before expiry, so a forged token is never
    /// reported as merely expired.
    pub fn verify_at<T: DeserializeOwned>(&self, now: i64, token: &str) -> Result<T, TokenError> {
        let mut validation = Validation::new(ALGORITHM);
        // expiry is compared against `now` below
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let decoded = jsonwebtoken::decode::<TokenClaims<T>>(token, &self.decoding, &validation)
            .map_err(|e| match e.kind() {
                JwtErrorKind::InvalidSignature
                | JwtErrorKind::InvalidAlgorithm
                | JwtErrorKind::InvalidAlgorithmName
                | JwtErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if decoded.claims.exp <= now {
            return Err(TokenError::Expired);
        }

        Ok(decoded.claims.data)
    }
}

impl fmt::Debug for TokenCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCodec")
            .field("algorithm", &ALGORITHM)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}
