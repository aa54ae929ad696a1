//! Auth Middleware
//!
//! Installed globally in front of every route. Resolves the credential
//! cookies, injects [`Identity`] for downstream handlers and the
//! authorization gate, and sends back a renewed access token when one was
//! minted. Soft failures continue anonymously; hard failures end the request.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use kernel::identity::Identity;
use platform::cookie::extract_cookie;
use platform::token::TokenCodec;

use crate::application::config::AuthConfig;
use crate::application::{AuthenticateUseCase, Resolution};
use crate::domain::repository::SessionStore;

/// Middleware state
pub struct AuthMiddlewareState<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    pub sessions: Arc<S>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
}

impl<S> Clone for AuthMiddlewareState<S>
where
    S: SessionStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            sessions: self.sessions.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
        }
    }
}

/// Resolve identity for every request.
///
/// Use with `axum::middleware::from_fn_with_state(state, authenticate::<S>)`.
pub async fn authenticate<S>(
    State(state): State<AuthMiddlewareState<S>>,
    mut req: Request,
    next: Next,
) -> Response
where
    S: SessionStore + Send + Sync + 'static,
{
    let access_token = extract_cookie(req.headers(), &state.config.access_cookie_name);
    let refresh_token = extract_cookie(req.headers(), &state.config.refresh_cookie_name);

    let use_case = AuthenticateUseCase::new(
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
    );

    let resolution = match use_case
        .execute(access_token.as_deref(), refresh_token.as_deref())
        .await
    {
        Ok(resolution) => resolution,
        Err(e) => return e.into_response(),
    };

    if let Some(user_id) = resolution.user_id() {
        req.extensions_mut().insert(Identity::new(user_id));
    }

    let mut response = next.run(req).await;

    if let Resolution::Renewed { access_token, .. } = &resolution {
        // A handler that already wrote this cookie (e.g. sign-out) wins
        if !sets_cookie(&response, &state.config.access_cookie_name) {
            if let Some(value) = state.config.access_cookie().set_cookie_header(access_token) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
    }

    response
}

fn sets_cookie(response: &Response, name: &str) -> bool {
    let prefix = format!("{}=", name);
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .any(|value| value.starts_with(&prefix))
}
