//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::domain::repository::{SessionStore, UserRepository};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::AuthMiddlewareState;

/// Create the Auth router for any repository / session store pair
///
/// Mount under `/api/auth`. The global `authenticate` middleware must wrap
/// the whole application for `/status` to see the identity.
pub fn auth_router<U, S>(
    users: Arc<U>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
) -> Router
where
    U: UserRepository + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
{
    let state = AuthAppState {
        users,
        sessions,
        codec,
        config,
    };

    Router::new()
        .route("/signup", post(handlers::sign_up::<U, S>))
        .route("/signin", post(handlers::sign_in::<U, S>))
        .route("/signout", post(handlers::sign_out::<U, S>))
        .route("/token", post(handlers::renew_token::<U, S>))
        .route("/status", get(handlers::session_status))
        .with_state(state)
}

/// State for the global `authenticate` middleware
pub fn auth_middleware_state<S>(
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
) -> AuthMiddlewareState<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    AuthMiddlewareState {
        sessions,
        codec,
        config,
    }
}
