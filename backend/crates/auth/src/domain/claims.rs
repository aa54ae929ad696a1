//! Identity claims carried by session records and tokens
//!
//! Three shapes, each decoded once into a typed struct:
//! - [`SessionClaims`]: the session record value and the access-token payload
//! - [`RefreshClaims`]: the refresh-token payload
//! - [`IdentityClaims`]: everything known at login, split before anything
//!   is persisted or signed

use kernel::id::SessionId;
use serde::{Deserialize, Serialize};

/// セッションレコードとアクセストークンのペイロード
///
/// セッション ID を含まないため、アクセストークンから
/// セッションを特定することはできない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionClaims {
    pub email: String,
    pub user_id: String,
}

/// リフレッシュトークンのペイロード（`{sessionId, userId}` のみ）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshClaims {
    pub session_id: SessionId,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityClaims {
    pub email: String,
    pub user_id: String,
    pub session_id: SessionId,
}

impl IdentityClaims {
    /// Start a fresh session for a user.
    pub fn new_session(email: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            user_id: user_id.into(),
            session_id: SessionId::new(),
        }
    }

    /// Strip the session id from the claims that get stored and signed.
    pub fn split(self) -> (SessionId, SessionClaims) {
        (
            self.session_id,
            SessionClaims {
                email: self.email,
                user_id: self.user_id,
            },
        )
    }

    pub fn refresh_claims(&self) -> RefreshClaims {
        RefreshClaims {
            session_id: self.session_id,
            user_id: self.user_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_claims_are_camel_case_without_session_id() {
        let (_, claims) = IdentityClaims::new_session("a@b.com", "42").split();
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json, serde_json::json!({"email": "a@b.com", "userId": "42"}));
    }

    #[test]
    fn refresh_claims_are_exactly_session_and_user() {
        let identity = IdentityClaims::new_session("a@b.com", "42");
        let json = serde_json::to_value(identity.refresh_claims()).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 2);
        assert_eq!(object["userId"], "42");
        assert_eq!(object["sessionId"], identity.session_id.to_string());
    }

    #[test]
    fn split_keeps_the_same_session_id() {
        let identity = IdentityClaims::new_session("a@b.com", "42");
        let expected = identity.session_id;
        let (session_id, claims) = identity.split();
        assert_eq!(session_id, expected);
        assert_eq!(claims.user_id, "42");
    }
}
