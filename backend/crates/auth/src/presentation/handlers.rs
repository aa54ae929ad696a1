//! HTTP Handlers

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{AppendHeaders, IntoResponse};
use kernel::extract::Json;
use kernel::identity::Identity;
use platform::cookie::extract_cookie;
use platform::token::TokenCodec;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::{
    IssuedSession, RenewTokenUseCase, SignInInput, SignInUseCase, SignOutUseCase, SignUpInput,
    SignUpUseCase,
};
use crate::domain::repository::{SessionStore, UserRepository};
use crate::error::AuthResult;
use crate::presentation::dto::{
    CredentialsRequest, MessageResponse, SessionOpenedResponse, SessionStatusResponse,
};

/// Shared state for auth handlers
pub struct AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    pub users: Arc<U>,
    pub sessions: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

// Manual impl: the repositories themselves need not be `Clone`.
impl<U, S> Clone for AuthAppState<U, S>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            users: self.users.clone(),
            sessions: self.sessions.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

/// Both credential cookies for a freshly opened session
fn session_cookies(
    config: &AuthConfig,
    session: &IssuedSession,
) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    AppendHeaders([
        (
            header::SET_COOKIE,
            config.access_cookie().build_set_cookie(&session.access_token),
        ),
        (
            header::SET_COOKIE,
            config.refresh_cookie().build_set_cookie(&session.refresh_token),
        ),
    ])
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let session = use_case
        .execute(SignUpInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        session_cookies(&state.config, &session),
        Json(SessionOpenedResponse {
            message: "Successful registration.",
            user_id: session.user_id,
            email: session.email,
        }),
    ))
}

// ============================================================================
// Sign In
// ============================================================================

/// POST /api/auth/signin
pub async fn sign_in<U, S>(
    State(state): State<AuthAppState<U, S>>,
    Json(req): Json<CredentialsRequest>,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let use_case = SignInUseCase::new(
        state.users.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let session = use_case
        .execute(SignInInput {
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::OK,
        session_cookies(&state.config, &session),
        Json(SessionOpenedResponse {
            message: "Successful login.",
            user_id: session.user_id,
            email: session.email,
        }),
    ))
}

// ============================================================================
// Sign Out
// ============================================================================

/// POST /api/auth/signout
pub async fn sign_out<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let refresh_token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = SignOutUseCase::new(
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );
    use_case.execute(refresh_token.as_deref()).await?;

    Ok((
        StatusCode::NO_CONTENT,
        AppendHeaders([
            (
                header::SET_COOKIE,
                state.config.access_cookie().build_delete_cookie(),
            ),
            (
                header::SET_COOKIE,
                state.config.refresh_cookie().build_delete_cookie(),
            ),
        ]),
    ))
}

// ============================================================================
// Token renewal
// ============================================================================

/// POST /api/auth/token
pub async fn renew_token<U, S>(
    State(state): State<AuthAppState<U, S>>,
    headers: HeaderMap,
) -> AuthResult<impl IntoResponse>
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let refresh_token = extract_cookie(&headers, &state.config.refresh_cookie_name);

    let use_case = RenewTokenUseCase::new(
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );
    let renewal = use_case.execute(refresh_token.as_deref()).await?;

    Ok((
        StatusCode::OK,
        [(
            header::SET_COOKIE,
            state.config.access_cookie().build_set_cookie(&renewal.access_token),
        )],
        Json(MessageResponse {
            message: "Access token successfully renewed.",
        }),
    ))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/status
pub async fn session_status(identity: Option<Identity>) -> Json<SessionStatusResponse> {
    Json(SessionStatusResponse {
        authenticated: identity.is_some(),
        user_id: identity.map(|i| i.user_id),
    })
}
