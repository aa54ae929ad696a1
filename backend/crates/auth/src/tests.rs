//! Crate-level tests for the auth flows
//!
//! Everything runs against the real router and middleware with in-memory
//! stores, so cookies, status codes and store traffic are observed exactly
//! as a client would see them.

#[cfg(test)]
mod support {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, Response, header};
    use axum::middleware::{from_fn, from_fn_with_state};
    use axum::routing::{get, post};
    use kernel::id::SessionId;
    use kernel::identity::{Identity, require_identity};
    use platform::password::HashedPassword;
    use platform::token::TokenCodec;

    use crate::application::config::AuthConfig;
    use crate::domain::claims::{RefreshClaims, SessionClaims};
    use crate::domain::entity::user::UserCredentials;
    use crate::domain::repository::{SessionStore, UserRepository};
    use crate::domain::value_object::email::Email;
    use crate::error::{AuthError, AuthResult};
    use crate::infra::{InMemorySessionStore, InMemoryUserRepository};
    use crate::presentation::middleware::authenticate;
    use crate::presentation::router::{auth_middleware_state, auth_router};

    pub const NOW_SKEW: i64 = 10_000;

    /// Session store that counts every round-trip
    #[derive(Default)]
    pub struct CountingSessionStore {
        pub inner: InMemorySessionStore,
        pub gets: AtomicUsize,
        pub puts: AtomicUsize,
        pub deletes: AtomicUsize,
    }

    impl CountingSessionStore {
        pub fn calls(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
                + self.puts.load(Ordering::SeqCst)
                + self.deletes.load(Ordering::SeqCst)
        }
    }

    impl SessionStore for CountingSessionStore {
        async fn get(&self, user_id: &str, session_id: &SessionId) -> AuthResult<SessionClaims> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.inner.get(user_id, session_id).await
        }

        async fn put(
            &self,
            user_id: &str,
            session_id: &SessionId,
            claims: &SessionClaims,
            ttl: Duration,
        ) -> AuthResult<()> {
            self.puts.fetch_add(1, Ordering::SeqCst);
            self.inner.put(user_id, session_id, claims, ttl).await
        }

        async fn delete(&self, user_id: &str, session_id: &SessionId) -> AuthResult<bool> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete(user_id, session_id).await
        }
    }

    /// Session store whose every call fails, optionally after a delay
    pub struct BrokenSessionStore {
        pub delay: Option<Duration>,
    }

    impl BrokenSessionStore {
        async fn fail<T>(&self) -> AuthResult<T> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            Err(AuthError::SessionStore("connection refused".into()))
        }
    }

    impl SessionStore for BrokenSessionStore {
        async fn get(&self, _: &str, _: &SessionId) -> AuthResult<SessionClaims> {
            self.fail().await
        }

        async fn put(&self, _: &str, _: &SessionId, _: &SessionClaims, _: Duration) -> AuthResult<()> {
            self.fail().await
        }

        async fn delete(&self, _: &str, _: &SessionId) -> AuthResult<bool> {
            self.fail().await
        }
    }

    /// User repository that counts every call
    #[derive(Default)]
    pub struct CountingUserRepository {
        pub inner: InMemoryUserRepository,
        pub calls: AtomicUsize,
    }

    impl UserRepository for CountingUserRepository {
        async fn create(&self, email: &Email, password_hash: &HashedPassword) -> AuthResult<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.create(email, password_hash).await
        }

        async fn find_credentials(&self, email: &Email) -> AuthResult<Option<UserCredentials>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.find_credentials(email).await
        }
    }

    pub fn config() -> Arc<AuthConfig> {
        Arc::new(AuthConfig {
            token_secret: b"auth-crate-test-secret".to_vec(),
            ..AuthConfig::default()
        })
    }

    pub fn codec() -> TokenCodec {
        config().token_codec()
    }

    async fn whoami(identity: Option<Identity>) -> String {
        identity.map(|i| i.user_id).unwrap_or_else(|| "anonymous".into())
    }

    async fn owner(identity: Identity) -> String {
        identity.user_id
    }

    /// Auth routes plus a public and a gated probe route, all behind the
    /// global `authenticate` middleware.
    pub fn app<U, S>(users: Arc<U>, sessions: Arc<S>, config: Arc<AuthConfig>) -> Router
    where
        U: UserRepository + Send + Sync + 'static,
        S: SessionStore + Send + Sync + 'static,
    {
        let codec = Arc::new(config.token_codec());

        let gated = Router::new()
            .route("/write", post(owner))
            .route_layer(from_fn(require_identity));

        Router::new()
            .nest(
                "/api/auth",
                auth_router(users, sessions.clone(), codec.clone(), config.clone()),
            )
            .route("/whoami", get(whoami))
            .merge(gated)
            .layer(from_fn_with_state(
                auth_middleware_state(sessions, codec, config),
                authenticate::<S>,
            ))
    }

    pub fn request(method: &str, uri: &str, cookies: &[(&str, &str)]) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if !cookies.is_empty() {
            let cookie = cookies
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect::<Vec<_>>()
                .join("; ");
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    pub fn json_request(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_string(res: Response<Body>) -> String {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    pub async fn body_json(res: Response<Body>) -> serde_json::Value {
        serde_json::from_str(&body_string(res).await).unwrap()
    }

    /// Value of a cookie set by the response, if any
    pub fn set_cookie<'a>(res: &'a Response<Body>, name: &str) -> Option<&'a str> {
        let prefix = format!("{}=", name);
        res.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .find(|v| v.starts_with(&prefix))
    }

    pub fn cookie_value(set_cookie: &str) -> &str {
        let (pair, _) = set_cookie.split_once(';').unwrap_or((set_cookie, ""));
        pair.split_once('=').map(|(_, v)| v).unwrap_or("")
    }

    pub fn session_claims(user_id: &str) -> SessionClaims {
        SessionClaims {
            email: "a@b.com".into(),
            user_id: user_id.into(),
        }
    }

    pub fn refresh_token(user_id: &str, session_id: SessionId) -> String {
        codec()
            .issue(
                Duration::from_secs(3600),
                &RefreshClaims {
                    session_id,
                    user_id: user_id.into(),
                },
            )
            .unwrap()
    }

    pub fn expired_access_token(user_id: &str) -> String {
        let now = chrono::Utc::now().timestamp();
        codec()
            .issue_at(now - NOW_SKEW, Duration::from_secs(300), &session_claims(user_id))
            .unwrap()
    }

    pub fn valid_access_token(user_id: &str) -> String {
        codec()
            .issue(Duration::from_secs(300), &session_claims(user_id))
            .unwrap()
    }
}

#[cfg(test)]
mod middleware_tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use axum::http::StatusCode;
    use kernel::id::SessionId;
    use tower::ServiceExt;

    use super::support::*;
    use crate::domain::claims::SessionClaims;
    use crate::domain::repository::SessionStore;
    use crate::infra::InMemoryUserRepository;

    #[tokio::test]
    async fn valid_access_token_skips_the_store() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app
            .oneshot(request("GET", "/whoami", &[("accessToken", &valid_access_token("42"))]))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res, "accessToken").is_none());
        assert_eq!(body_string(res).await, "42");
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn valid_access_token_with_refresh_cookie_still_skips_the_store() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());
        let refresh = refresh_token("42", SessionId::new());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[
                    ("accessToken", &valid_access_token("42")),
                    ("refreshToken", &refresh),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(body_string(res).await, "42");
        assert_eq!(sessions.gets.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn expired_access_and_live_session_renews() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        sessions
            .put("42", &session_id, &session_claims("42"), Duration::from_secs(60))
            .await
            .unwrap();
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[
                    ("accessToken", &expired_access_token("42")),
                    ("refreshToken", &refresh_token("42", session_id)),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        let cookie = set_cookie(&res, "accessToken")
            .expect("renewed access cookie")
            .to_string();
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.contains("Max-Age=300"));
        assert!(cookie.contains("Expires="));
        assert_eq!(body_string(res).await, "42");

        // The new token carries the stored claims, never the session id
        let renewed: SessionClaims = codec().verify(cookie_value(&cookie)).unwrap();
        assert_eq!(renewed, session_claims("42"));
        let raw: serde_json::Value = codec().verify(cookie_value(&cookie)).unwrap();
        assert!(raw.get("sessionId").is_none());
    }

    #[tokio::test]
    async fn missing_access_and_live_session_renews() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        sessions
            .put("7", &session_id, &session_claims("7"), Duration::from_secs(60))
            .await
            .unwrap();
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[("refreshToken", &refresh_token("7", session_id))],
            ))
            .await
            .unwrap();

        assert!(set_cookie(&res, "accessToken").is_some());
        assert_eq!(body_string(res).await, "7");
        assert_eq!(sessions.gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn missing_session_record_is_anonymous() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[
                    ("accessToken", &expired_access_token("42")),
                    ("refreshToken", &refresh_token("42", SessionId::new())),
                ],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res, "accessToken").is_none());
        assert_eq!(body_string(res).await, "anonymous");
        assert_eq!(sessions.gets.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_cookies_is_anonymous() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app.oneshot(request("GET", "/whoami", &[])).await.unwrap();

        assert_eq!(body_string(res).await, "anonymous");
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn expired_access_without_refresh_is_anonymous() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[("accessToken", &expired_access_token("42"))],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "anonymous");
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn forged_refresh_token_is_anonymous() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());
        let forged = platform::token::TokenCodec::new(b"someone-else")
            .issue(
                Duration::from_secs(3600),
                &crate::domain::claims::RefreshClaims {
                    session_id: SessionId::new(),
                    user_id: "42".into(),
                },
            )
            .unwrap();

        let res = app
            .oneshot(request("GET", "/whoami", &[("refreshToken", &forged)]))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, "anonymous");
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn session_owned_by_another_user_is_anonymous() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        // Record under user 42's key but claiming user 43
        sessions
            .put("42", &session_id, &session_claims("43"), Duration::from_secs(60))
            .await
            .unwrap();
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[("refreshToken", &refresh_token("42", session_id))],
            ))
            .await
            .unwrap();

        assert!(set_cookie(&res, "accessToken").is_none());
        assert_eq!(body_string(res).await, "anonymous");
    }

    #[tokio::test]
    async fn tampered_access_token_is_a_server_error() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());
        let forged = platform::token::TokenCodec::new(b"someone-else")
            .issue(Duration::from_secs(300), &session_claims("1"))
            .unwrap();

        let res = app
            .oneshot(request("GET", "/whoami", &[("accessToken", &forged)]))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn malformed_access_token_is_a_server_error() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions, config());

        let res = app
            .oneshot(request("GET", "/whoami", &[("accessToken", "garbage")]))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn store_failure_is_a_hard_failure() {
        let sessions = Arc::new(BrokenSessionStore { delay: None });
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions, config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[("refreshToken", &refresh_token("42", SessionId::new()))],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_store_times_out() {
        let sessions = Arc::new(BrokenSessionStore {
            delay: Some(Duration::from_secs(60)),
        });
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions, config());

        let res = app
            .oneshot(request(
                "GET",
                "/whoami",
                &[("refreshToken", &refresh_token("42", SessionId::new()))],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn concurrent_renewals_both_succeed() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        sessions
            .put("42", &session_id, &session_claims("42"), Duration::from_secs(60))
            .await
            .unwrap();
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions.clone(), config());
        let refresh = refresh_token("42", session_id);
        let cookies = [("refreshToken", refresh.as_str())];

        let (a, b) = tokio::join!(
            app.clone().oneshot(request("GET", "/whoami", &cookies)),
            app.clone().oneshot(request("GET", "/whoami", &cookies)),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        for res in [&a, &b] {
            let cookie = set_cookie(res, "accessToken").expect("renewed access cookie");
            let claims: SessionClaims = codec().verify(cookie_value(cookie)).unwrap();
            assert_eq!(claims.user_id, "42");
        }
        assert_eq!(body_string(a).await, "42");
        assert_eq!(body_string(b).await, "42");
        assert_eq!(sessions.gets.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gate_rejects_anonymous_writes() {
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions, config());

        let res = app
            .oneshot(request(
                "POST",
                "/write",
                &[("refreshToken", &refresh_token("42", SessionId::new()))],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body = body_json(res).await;
        assert_eq!(body["message"], "Action requires authorization");
    }

    #[tokio::test]
    async fn gate_admits_renewed_identity() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        sessions
            .put("42", &session_id, &session_claims("42"), Duration::from_secs(60))
            .await
            .unwrap();
        let app = app(Arc::new(InMemoryUserRepository::new()), sessions, config());

        let res = app
            .oneshot(request(
                "POST",
                "/write",
                &[("refreshToken", &refresh_token("42", session_id))],
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res, "accessToken").is_some());
        assert_eq!(body_string(res).await, "42");
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use kernel::id::SessionId;

    use super::support::*;
    use crate::application::{AuthenticateUseCase, RenewTokenUseCase, Resolution};
    use crate::domain::repository::SessionStore;
    use crate::error::AuthError;

    #[tokio::test]
    async fn resolution_user_ids() {
        assert_eq!(Resolution::Anonymous.user_id(), None);
        assert_eq!(
            Resolution::Authenticated {
                user_id: "1".into()
            }
            .user_id(),
            Some("1")
        );
    }

    #[tokio::test]
    async fn renewal_is_pinned_to_the_given_clock() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        sessions
            .put("42", &session_id, &session_claims("42"), Duration::from_secs(60))
            .await
            .unwrap();
        let codec = Arc::new(codec());
        let use_case = RenewTokenUseCase::new(sessions, codec.clone(), config());
        let refresh = refresh_token("42", session_id);

        let now = chrono::Utc::now().timestamp();
        let renewal = use_case.execute_at(now, Some(&refresh)).await.unwrap();

        assert_eq!(renewal.user_id, "42");
        assert!(codec
            .verify_at::<serde_json::Value>(now + 299, &renewal.access_token)
            .is_ok());
        assert!(codec
            .verify_at::<serde_json::Value>(now + 300, &renewal.access_token)
            .is_err());
    }

    #[tokio::test]
    async fn explicit_renewal_errors() {
        let sessions = Arc::new(CountingSessionStore::default());
        let use_case = RenewTokenUseCase::new(sessions, Arc::new(codec()), config());

        assert!(matches!(
            use_case.execute(None).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            use_case.execute(Some("garbage")).await,
            Err(AuthError::Unauthorized)
        ));
        assert!(matches!(
            use_case
                .execute(Some(&refresh_token("42", SessionId::new())))
                .await,
            Err(AuthError::SessionNotFound)
        ));
    }

    #[tokio::test]
    async fn expired_refresh_token_is_anonymous() {
        let sessions = Arc::new(CountingSessionStore::default());
        let session_id = SessionId::new();
        sessions
            .put("42", &session_id, &session_claims("42"), Duration::from_secs(60))
            .await
            .unwrap();
        let use_case = AuthenticateUseCase::new(sessions.clone(), Arc::new(codec()), config());
        let refresh = refresh_token("42", session_id);

        // One hour later the refresh token is past its exp
        let later = chrono::Utc::now().timestamp() + 3600 + 1;
        let resolution = use_case.execute_at(later, None, Some(&refresh)).await.unwrap();

        assert_eq!(resolution, Resolution::Anonymous);
        assert_eq!(sessions.calls(), 1);
    }
}

#[cfg(test)]
mod sign_up_tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;

    use axum::http::StatusCode;
    use platform::token::TokenCodec;
    use tower::ServiceExt;

    use super::support::*;
    use crate::domain::claims::RefreshClaims;
    use crate::domain::repository::SessionStore;

    #[tokio::test]
    async fn invalid_email_is_rejected_before_hashing_or_storage() {
        let users = Arc::new(CountingUserRepository::default());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users.clone(), sessions.clone(), config());

        let res = app
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "not-an-email", "password": "long enough password"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["message"], "Please enter a valid email.");
        assert_eq!(users.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn weak_password_is_rejected_before_storage() {
        let users = Arc::new(CountingUserRepository::default());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users.clone(), sessions.clone(), config());

        let res = app
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "a@b.com", "password": "short"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(users.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn missing_password_field_is_a_bad_request_problem() {
        let users = Arc::new(CountingUserRepository::default());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users.clone(), sessions.clone(), config());

        let res = app
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "a@b.com"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body = body_json(res).await;
        assert_eq!(body["status"], 400);
        assert!(body["message"].as_str().unwrap().contains("password"));
        assert_eq!(users.calls.load(Ordering::SeqCst), 0);
        assert_eq!(sessions.calls(), 0);
    }

    #[tokio::test]
    async fn sign_in_without_content_type_is_a_bad_request() {
        let app = app(
            Arc::new(CountingUserRepository::default()),
            Arc::new(CountingSessionStore::default()),
            config(),
        );

        let res = app
            .oneshot(
                axum::http::Request::builder()
                    .method("POST")
                    .uri("/api/auth/signin")
                    .body(axum::body::Body::from(
                        r#"{"email":"a@b.com","password":"whatever123"}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(res).await["title"], "Bad Request");
    }

    #[tokio::test]
    async fn sign_up_opens_a_session_and_sets_both_cookies() {
        let users = Arc::new(CountingUserRepository::default());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users.clone(), sessions.clone(), config());

        let res = app
            .clone()
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "New.User@Shop.com", "password": "correct horse"}),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::CREATED);
        let access = set_cookie(&res, "accessToken").unwrap().to_string();
        let refresh = set_cookie(&res, "refreshToken").unwrap().to_string();
        assert!(access.contains("Max-Age=300"));
        assert!(refresh.contains(&format!("Max-Age={}", 30 * 24 * 3600)));
        assert!(refresh.contains("HttpOnly"));

        let body = body_json(res).await;
        assert_eq!(body["userId"], "1");
        assert_eq!(body["email"], "new.user@shop.com");

        // The refresh token points at the stored session record
        let codec: TokenCodec = codec();
        let claims: RefreshClaims = codec.verify(cookie_value(&refresh)).unwrap();
        assert_eq!(claims.user_id, "1");
        let record = sessions
            .get(&claims.user_id, &claims.session_id)
            .await
            .unwrap();
        assert_eq!(record.email, "new.user@shop.com");

        // Duplicate registration
        let res = app
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "new.user@shop.com", "password": "another password"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        assert_eq!(
            body_json(res).await["message"],
            "An account with this email already exists."
        );
    }
}

#[cfg(test)]
mod sign_in_tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use tower::ServiceExt;

    use super::support::*;
    use crate::infra::InMemoryUserRepository;

    #[tokio::test]
    async fn sign_in_status_and_sign_out() {
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users, sessions.clone(), config());

        let res = app
            .clone()
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "a@b.com", "password": "correct horse"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        // Wrong password and unknown email look the same
        for (email, password) in [("a@b.com", "wrong horse"), ("x@b.com", "correct horse")] {
            let res = app
                .clone()
                .oneshot(json_request(
                    "/api/auth/signin",
                    serde_json::json!({"email": email, "password": password}),
                ))
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
            assert_eq!(body_json(res).await["message"], "Wrong email or password.");
        }

        let res = app
            .clone()
            .oneshot(json_request(
                "/api/auth/signin",
                serde_json::json!({"email": "A@B.com", "password": "correct horse"}),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let access = cookie_value(set_cookie(&res, "accessToken").unwrap()).to_string();
        let refresh = cookie_value(set_cookie(&res, "refreshToken").unwrap()).to_string();
        assert_eq!(sessions.inner.live_count().await, 2);

        let res = app
            .clone()
            .oneshot(request("GET", "/api/auth/status", &[("accessToken", &access)]))
            .await
            .unwrap();
        let body = body_json(res).await;
        assert_eq!(body["authenticated"], true);
        assert_eq!(body["userId"], "1");

        let res = app
            .clone()
            .oneshot(request(
                "POST",
                "/api/auth/signout",
                &[("refreshToken", &refresh)],
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
        assert!(set_cookie(&res, "accessToken").unwrap().contains("Max-Age=0"));
        assert!(set_cookie(&res, "refreshToken").unwrap().contains("Max-Age=0"));
        assert_eq!(sessions.inner.live_count().await, 1);

        // The revoked refresh token no longer yields an identity
        let res = app
            .oneshot(request("GET", "/whoami", &[("refreshToken", &refresh)]))
            .await
            .unwrap();
        assert_eq!(body_string(res).await, "anonymous");
    }

    #[tokio::test]
    async fn sign_out_does_not_reissue_access_cookie() {
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users, sessions.clone(), config());

        let res = app
            .clone()
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "a@b.com", "password": "correct horse"}),
            ))
            .await
            .unwrap();
        let refresh = cookie_value(set_cookie(&res, "refreshToken").unwrap()).to_string();

        // Expired access token: the middleware renews before the handler runs
        let res = app
            .oneshot(request(
                "POST",
                "/api/auth/signout",
                &[
                    ("accessToken", &expired_access_token("1")),
                    ("refreshToken", &refresh),
                ],
            ))
            .await
            .unwrap();

        let access_cookies: Vec<_> = res
            .headers()
            .get_all(axum::http::header::SET_COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .filter(|v| v.starts_with("accessToken="))
            .collect();
        assert_eq!(access_cookies.len(), 1);
        assert!(access_cookies[0].contains("Max-Age=0"));
    }

    #[tokio::test]
    async fn token_endpoint() {
        let users = Arc::new(InMemoryUserRepository::new());
        let sessions = Arc::new(CountingSessionStore::default());
        let app = app(users, sessions, config());

        let res = app
            .clone()
            .oneshot(request("POST", "/api/auth/token", &[]))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = app
            .clone()
            .oneshot(json_request(
                "/api/auth/signup",
                serde_json::json!({"email": "a@b.com", "password": "correct horse"}),
            ))
            .await
            .unwrap();
        let refresh = cookie_value(set_cookie(&res, "refreshToken").unwrap()).to_string();

        let res = app
            .oneshot(request(
                "POST",
                "/api/auth/token",
                &[("refreshToken", &refresh)],
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert!(set_cookie(&res, "accessToken").is_some());
        assert_eq!(
            body_json(res).await["message"],
            "Access token successfully renewed."
        );
    }
}
