//! In-memory implementations
//!
//! Used by tests and by local runs without Redis. Session records are kept
//! as serialized JSON so they behave like the Redis store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use kernel::id::SessionId;
use platform::password::HashedPassword;
use tokio::sync::RwLock;
use tokio::time::Instant;

use crate::domain::claims::SessionClaims;
use crate::domain::entity::user::UserCredentials;
use crate::domain::repository::{SessionStore, UserRepository, session_key};
use crate::domain::value_object::email::Email;
use crate::error::{AuthError, AuthResult};

/// Serialized record and its deadline; `None` for TTLs past the clock's range
type Entry = (String, Option<Instant>);

fn is_live(expires_at: Option<Instant>, now: Instant) -> bool {
    expires_at.is_none_or(|deadline| deadline > now)
}

#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) records
    pub async fn live_count(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| is_live(*expires_at, now))
            .count()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str, session_id: &SessionId) -> AuthResult<SessionClaims> {
        let key = session_key(user_id, session_id);
        let entries = self.entries.read().await;
        match entries.get(&key) {
            Some((raw, expires_at)) if is_live(*expires_at, Instant::now()) => {
                serde_json::from_str(raw).map_err(|e| {
                    AuthError::SessionStore(format!("corrupt session record: {}", e))
                })
            }
            _ => Err(AuthError::SessionNotFound),
        }
    }

    async fn put(
        &self,
        user_id: &str,
        session_id: &SessionId,
        claims: &SessionClaims,
        ttl: Duration,
    ) -> AuthResult<()> {
        let raw = serde_json::to_string(claims)
            .map_err(|e| AuthError::SessionStore(e.to_string()))?;
        let now = Instant::now();
        let expires_at = now.checked_add(ttl.max(Duration::from_secs(1)));

        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, deadline)| is_live(*deadline, now));
        entries.insert(session_key(user_id, session_id), (raw, expires_at));
        Ok(())
    }

    async fn delete(&self, user_id: &str, session_id: &SessionId) -> AuthResult<bool> {
        let removed = self
            .entries
            .write()
            .await
            .remove(&session_key(user_id, session_id));
        Ok(removed.is_some_and(|(_, expires_at)| is_live(expires_at, Instant::now())))
    }
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, UserCredentials>>>,
    next_id: Arc<AtomicU64>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

impl UserRepository for InMemoryUserRepository {
    async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AuthResult<String> {
        let mut users = self.users.write().await;
        if users.contains_key(email.as_str()) {
            return Err(AuthError::EmailTaken);
        }

        let user_id = (self.next_id.fetch_add(1, Ordering::Relaxed) + 1).to_string();
        users.insert(
            email.as_str().to_string(),
            UserCredentials {
                user_id: user_id.clone(),
                email: email.clone(),
                password_hash: password_hash.clone(),
            },
        );
        Ok(user_id)
    }

    async fn find_credentials(&self, email: &Email) -> AuthResult<Option<UserCredentials>> {
        Ok(self.users.read().await.get(email.as_str()).cloned())
    }
}
