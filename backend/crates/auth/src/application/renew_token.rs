//! Renew Token Use Case
//!
//! Mints a new access token from a refresh token and its live session record.
//! Used directly by `POST /token` and, with soft-fail mapping, by the auth
//! middleware.

use std::sync::Arc;

use chrono::Utc;
use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::session::within;
use crate::domain::claims::RefreshClaims;
use crate::domain::repository::SessionStore;
use crate::error::{AuthError, AuthResult};

/// Result of a successful renewal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renewal {
    pub user_id: String,
    pub access_token: String,
}

pub struct RenewTokenUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<S> RenewTokenUseCase<S>
where
    S: SessionStore + Send + Sync,
{
    pub fn new(sessions: Arc<S>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            sessions,
            codec,
            config,
        }
    }

    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<Renewal> {
        self.execute_at(Utc::now().timestamp(), refresh_token).await
    }

    /// Renewal against an explicit clock.
    ///
    /// Errors: `Unauthorized` for a missing or unverifiable refresh token or
    /// a user mismatch, `SessionNotFound` for a revoked/expired session.
    /// Anything else is a store or signing failure.
    pub async fn execute_at(&self, now: i64, refresh_token: Option<&str>) -> AuthResult<Renewal> {
        let refresh_token = refresh_token.ok_or(AuthError::Unauthorized)?;

        let refresh: RefreshClaims = self.codec.verify_at(now, refresh_token).map_err(|e| {
            tracing::debug!(error = %e, "Refresh token rejected");
            AuthError::Unauthorized
        })?;

        let claims = within(
            self.config.store_timeout,
            self.sessions.get(&refresh.user_id, &refresh.session_id),
        )
        .await?;

        if claims.user_id != refresh.user_id {
            tracing::warn!(
                token_user_id = %refresh.user_id,
                session_user_id = %claims.user_id,
                session_id = %refresh.session_id,
                "Session record belongs to a different user"
            );
            return Err(AuthError::Unauthorized);
        }

        let access_token = self
            .codec
            .issue_at(now, self.config.access_token_ttl, &claims)?;

        tracing::debug!(user_id = %claims.user_id, "Access token renewed");

        Ok(Renewal {
            user_id: claims.user_id,
            access_token,
        })
    }
}
