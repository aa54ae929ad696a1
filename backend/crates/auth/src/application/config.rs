//! Application Configuration
//!
//! Configuration for the Auth application layer. Built once at startup and
//! shared read-only (`Arc<AuthConfig>`) by every request.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::token::TokenCodec;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

use crate::error::{AuthError, AuthResult};

const DAY: u64 = 24 * 3600;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    pub access_cookie_name: String,
    pub refresh_cookie_name: String,
    /// HS256 signing secret shared by access and refresh tokens
    pub token_secret: Vec<u8>,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Lifetime of the server-side session record
    pub session_ttl: Duration,
    /// Upper bound for a single session-store round-trip
    pub store_timeout: Duration,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_cookie_name: "accessToken".to_string(),
            refresh_cookie_name: "refreshToken".to_string(),
            token_secret: Vec::new(),
            access_token_ttl: Duration::from_secs(5 * 60),
            refresh_token_ttl: Duration::from_secs(356 * DAY),
            session_ttl: Duration::from_secs(30 * DAY),
            store_timeout: Duration::from_secs(2),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            password_pepper: None,
        }
    }
}

impl AuthConfig {
    /// Create config with a random token secret
    pub fn with_random_secret() -> Self {
        use rand::RngCore;
        let mut secret = vec![0u8; 32];
        rand::rng().fill_bytes(&mut secret);
        Self {
            token_secret: secret,
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    /// Read configuration from the environment.
    ///
    /// `JWT_SECRET` is mandatory in release builds. Debug builds fall back
    /// to a random secret, which invalidates all tokens on restart.
    pub fn from_env() -> AuthResult<Self> {
        let base = match std::env::var("JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => Self {
                token_secret: secret.into_bytes(),
                ..Default::default()
            },
            _ if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using a random secret");
                Self::with_random_secret()
            }
            _ => return Err(AuthError::Internal("JWT_SECRET must be set".into())),
        };

        Ok(Self {
            access_token_ttl: Duration::from_secs(env_or("ACCESS_TOKEN_TTL_SECS", 5 * 60)?),
            refresh_token_ttl: days("REFRESH_TOKEN_TTL_DAYS", env_or("REFRESH_TOKEN_TTL_DAYS", 356)?)?,
            session_ttl: days("SESSION_TTL_DAYS", env_or("SESSION_TTL_DAYS", 30)?)?,
            store_timeout: Duration::from_millis(env_or("SESSION_STORE_TIMEOUT_MS", 2000)?),
            cookie_secure: env_or("COOKIE_SECURE", true)?,
            password_pepper: std::env::var("PASSWORD_PEPPER")
                .ok()
                .filter(|p| !p.is_empty())
                .map(String::into_bytes),
            ..base
        })
    }

    /// Refresh tokens never outlive the session record they point at.
    pub fn effective_refresh_ttl(&self) -> Duration {
        self.refresh_token_ttl.min(self.session_ttl)
    }

    pub fn token_codec(&self) -> TokenCodec {
        TokenCodec::new(&self.token_secret)
    }

    pub fn access_cookie(&self) -> CookieConfig {
        CookieConfig::credential(&self.access_cookie_name, self.access_token_ttl)
            .with_secure(self.cookie_secure)
            .with_same_site(self.cookie_same_site)
    }

    pub fn refresh_cookie(&self) -> CookieConfig {
        CookieConfig::credential(&self.refresh_cookie_name, self.effective_refresh_ttl())
            .with_secure(self.cookie_secure)
            .with_same_site(self.cookie_same_site)
    }

}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_cookie_name", &self.access_cookie_name)
            .field("refresh_cookie_name", &self.refresh_cookie_name)
            .field("token_secret", &"[REDACTED]")
            .field("access_token_ttl", &self.access_token_ttl)
            .field("refresh_token_ttl", &self.refresh_token_ttl)
            .field("session_ttl", &self.session_ttl)
            .field("store_timeout", &self.store_timeout)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .finish_non_exhaustive()
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> AuthResult<T> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AuthError::Internal(format!("invalid value for {}: {:?}", key, raw))),
        Err(_) => Ok(default),
    }
}

fn days(key: &str, count: u64) -> AuthResult<Duration> {
    count
        .checked_mul(DAY)
        .map(Duration::from_secs)
        .ok_or_else(|| AuthError::Internal(format!("invalid value for {}: {} days", key, count)))
}
