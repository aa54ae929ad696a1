//! Sign Out Use Case
//!
//! Revokes the session a refresh token points at.

use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::session::within;
use crate::domain::claims::RefreshClaims;
use crate::domain::repository::SessionStore;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<S> SignOutUseCase<S>
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

    /// Delete the session behind `refresh_token`.
    ///
    /// An absent or unverifiable token has nothing to revoke and returns
    /// `Ok(false)`. Store failures are propagated.
    pub async fn execute(&self, refresh_token: Option<&str>) -> AuthResult<bool> {
        let Some(refresh_token) = refresh_token else {
            return Ok(false);
        };
        let refresh: RefreshClaims = match self.codec.verify(refresh_token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::debug!(error = %e, "Sign out with unusable refresh token");
                return Ok(false);
            }
        };

        let deleted = within(
            self.config.store_timeout,
            self.sessions.delete(&refresh.user_id, &refresh.session_id),
        )
        .await?;

        tracing::info!(
            user_id = %refresh.user_id,
            session_id = %refresh.session_id,
            deleted,
            "User signed out"
        );
        Ok(deleted)
    }
}
