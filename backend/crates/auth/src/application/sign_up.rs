//! Sign Up Use Case
//!
//! Creates a new user account and opens its first session.

use std::sync::Arc;

use platform::password::ClearTextPassword;
use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::session::{IssuedSession, open_session};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Sign up input
pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

/// Sign up use case
pub struct SignUpUseCase<U, S>
where
    U: UserRepository,
    S: SessionStore,
{
    user_repo: Arc<U>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
}

impl<U, S> SignUpUseCase<U, S>
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

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<IssuedSession> {
        // Both checks run before any hashing or storage
        let email = Email::new(input.email)?;
        let password = ClearTextPassword::new(input.password)?;

        let password_hash = password
            .hash_blocking(self.config.password_pepper.clone())
            .await?;

        let user_id = self.user_repo.create(&email, &password_hash).await?;

        tracing::info!(user_id = %user_id, "User signed up");

        open_session(
            self.sessions.as_ref(),
            &self.codec,
            &self.config,
            &email,
            &user_id,
        )
        .await
    }
}
