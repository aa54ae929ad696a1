//! Repository Traits
//!
//! Interfaces for session and user persistence. Implementations are in the
//! infrastructure layer.

use std::time::Duration;

use kernel::id::SessionId;
use platform::password::HashedPassword;

use crate::domain::claims::SessionClaims;
use crate::domain::entity::user::UserCredentials;
use crate::domain::value_object::email::Email;
use crate::error::AuthResult;

/// Key under which a session record is stored
pub fn session_key(user_id: &str, session_id: &SessionId) -> String {
    format!("sessions:{}:{}", user_id, session_id)
}

/// Session store adapter
///
/// One store round-trip per call; callers bound each call with a timeout.
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Load a session record.
    /// Fails with `AuthError::SessionNotFound` when absent or expired.
    async fn get(&self, user_id: &str, session_id: &SessionId) -> AuthResult<SessionClaims>;

    /// Upsert a session record with the given expiry.
    async fn put(
        &self,
        user_id: &str,
        session_id: &SessionId,
        claims: &SessionClaims,
        ttl: Duration,
    ) -> AuthResult<()>;

    /// Remove a session record. Returns whether one existed.
    async fn delete(&self, user_id: &str, session_id: &SessionId) -> AuthResult<bool>;
}

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Insert a new user and return its id.
    /// Fails with `AuthError::EmailTaken` on a duplicate email.
    async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AuthResult<String>;

    async fn find_credentials(&self, email: &Email) -> AuthResult<Option<UserCredentials>>;
}
