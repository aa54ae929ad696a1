//! Authenticate Use Case
//!
//! Resolves the credential cookies of one request into a [`Resolution`].
//!
//! | access cookie        | refresh cookie | outcome                                  |
//! |----------------------|----------------|------------------------------------------|
//! | valid                | any            | `Authenticated`, no store call           |
//! | tampered / malformed | any            | hard failure (`TamperedToken`)           |
//! | absent or expired    | absent         | `Anonymous`                              |
//! | absent or expired    | unverifiable   | `Anonymous`                              |
//! | absent or expired    | valid          | session lookup, then `Renewed` or `Anonymous` |
//!
//! Store failures other than "not found" are hard failures.

use std::sync::Arc;

use chrono::Utc;
use platform::token::{TokenCodec, TokenError};

use crate::application::config::AuthConfig;
use crate::application::renew_token::{Renewal, RenewTokenUseCase};
use crate::domain::claims::SessionClaims;
use crate::domain::repository::SessionStore;
use crate::error::{AuthError, AuthResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Anonymous,
    /// Valid access token, nothing to renew
    Authenticated { user_id: String },
    /// Identity recovered from the refresh token; the new access token must
    /// be sent back as a cookie
    Renewed {
        user_id: String,
        access_token: String,
    },
}

impl Resolution {
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Resolution::Anonymous => None,
            Resolution::Authenticated { user_id } | Resolution::Renewed { user_id, .. } => {
                Some(user_id)
            }
        }
    }
}

pub struct AuthenticateUseCase<S>
where
    S: SessionStore,
{
    codec: Arc<TokenCodec>,
    renew: RenewTokenUseCase<S>,
}

impl<S> AuthenticateUseCase<S>
where
    S: SessionStore + Send + Sync,
{
    pub fn new(sessions: Arc<S>, codec: Arc<TokenCodec>, config: Arc<AuthConfig>) -> Self {
        Self {
            renew: RenewTokenUseCase::new(sessions, codec.clone(), config),
            codec,
        }
    }

    pub async fn execute(
        &self,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> AuthResult<Resolution> {
        self.execute_at(Utc::now().timestamp(), access_token, refresh_token)
            .await
    }

    pub async fn execute_at(
        &self,
        now: i64,
        access_token: Option<&str>,
        refresh_token: Option<&str>,
    ) -> AuthResult<Resolution> {
        if let Some(access_token) = access_token {
            match self.codec.verify_at::<SessionClaims>(now, access_token) {
                Ok(claims) => {
                    return Ok(Resolution::Authenticated {
                        user_id: claims.user_id,
                    });
                }
                Err(TokenError::Expired) => {}
                Err(e) => return Err(AuthError::TamperedToken(e)),
            }
        }

        if refresh_token.is_none() {
            return Ok(Resolution::Anonymous);
        }

        match self.renew.execute_at(now, refresh_token).await {
            Ok(Renewal {
                user_id,
                access_token,
            }) => Ok(Resolution::Renewed {
                user_id,
                access_token,
            }),
            Err(AuthError::Unauthorized | AuthError::SessionNotFound) => {
                tracing::debug!("Refresh failed softly, continuing anonymously");
                Ok(Resolution::Anonymous)
            }
            Err(e) => Err(e),
        }
    }
}
