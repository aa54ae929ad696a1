//! Session lifecycle helpers
//!
//! Opening a session is the single entry point that creates session records;
//! sign-up and sign-in both go through [`open_session`].

use std::future::Future;
use std::time::Duration;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::domain::claims::IdentityClaims;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Tokens minted for a freshly opened session
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user_id: String,
    pub email: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// Bound a session-store call. A stalled store is a hard failure.
pub(crate) async fn within<T, F>(limit: Duration, call: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    tokio::time::timeout(limit, call)
        .await
        .map_err(|_| AuthError::StoreTimeout)?
}

/// Write a new session record and mint both tokens over it.
pub async fn open_session<S>(
    sessions: &S,
    codec: &TokenCodec,
    config: &AuthConfig,
    email: &Email,
    user_id: &str,
) -> AuthResult<IssuedSession>
where
    S: SessionStore + Sync,
{
    let identity = IdentityClaims::new_session(email.as_str(), user_id);
    let refresh_claims = identity.refresh_claims();
    let (session_id, claims) = identity.split();

    within(
        config.store_timeout,
        sessions.put(user_id, &session_id, &claims, config.session_ttl),
    )
    .await?;

    let access_token = codec.issue(config.access_token_ttl, &claims)?;
    let refresh_token = codec.issue(config.effective_refresh_ttl(), &refresh_claims)?;

    tracing::info!(user_id = %user_id, session_id = %session_id, "Session opened");

    Ok(IssuedSession {
        user_id: claims.user_id,
        email: claims.email,
        access_token,
        refresh_token,
    })
}
