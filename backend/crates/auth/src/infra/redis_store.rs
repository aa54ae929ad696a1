//! Redis Session Store
//!
//! Session records live under `sessions:{userId}:{sessionId}` as the JSON of
//! [`SessionClaims`], written with `SET .. EX`.

use std::time::Duration;

use kernel::id::SessionId;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::domain::claims::SessionClaims;
use crate::domain::repository::{SessionStore, session_key};
use crate::error::{AuthError, AuthResult};

/// Redis-backed session store
///
/// Cloning is cheap: the multiplexed connection is shared by every clone.
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
}

impl RedisSessionStore {
    pub async fn connect(url: &str) -> AuthResult<Self> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to session store");
        Ok(Self { conn })
    }

    pub fn from_connection(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

impl SessionStore for RedisSessionStore {
    async fn get(&self, user_id: &str, session_id: &SessionId) -> AuthResult<SessionClaims> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn.get(session_key(user_id, session_id)).await?;
        let raw = raw.ok_or(AuthError::SessionNotFound)?;

        serde_json::from_str(&raw)
            .map_err(|e| AuthError::SessionStore(format!("corrupt session record: {}", e)))
    }

    async fn put(
        &self,
        user_id: &str,
        session_id: &SessionId,
        claims: &SessionClaims,
        ttl: Duration,
    ) -> AuthResult<()> {
        let value = serde_json::to_string(claims)
            .map_err(|e| AuthError::SessionStore(e.to_string()))?;
        // EX 0 is rejected by Redis
        let seconds = ttl.as_secs().max(1);

        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(session_key(user_id, session_id), value, seconds)
            .await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str, session_id: &SessionId) -> AuthResult<bool> {
        let mut conn = self.conn.clone();
        let removed: u64 = conn.del(session_key(user_id, session_id)).await?;
        Ok(removed > 0)
    }
}
