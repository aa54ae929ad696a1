//! Sign In Use Case
//!
//! Checks credentials and opens a new session.

use std::sync::Arc;

use platform::password::ClearTextPassword;
use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::session::{IssuedSession, open_session};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository + Send + Sync,
    S: SessionStore + Send + Sync,
{
    pub fn new(
        user_repo: Arc<U>,
        sessions: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            sessions,
            codec,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<IssuedSession> {
        // A malformed email cannot belong to any account
        let email = Email::new(input.email).map_err(|_| AuthError::InvalidCredentials)?;

        let credentials = self
            .user_repo
            .find_credentials(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password = ClearTextPassword::for_verification(input.password);
        let valid = credentials
            .password_hash
            .clone()
            .verify_blocking(password, self.config.password_pepper.clone())
            .await?;

        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %credentials.user_id, "User signed in");

        open_session(
            self.sessions.as_ref(),
            &self.codec,
            &self.config,
            &credentials.email,
            &credentials.user_id,
        )
        .await
    }
}
