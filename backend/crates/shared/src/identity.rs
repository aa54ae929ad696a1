//! Request identity and the authorization gate
//!
//! The auth middleware resolves cookies into an [`Identity`] and stores it in
//! the request extensions. Everything downstream only reads it:
//! handlers extract `Identity` (or `Option<Identity>`) and write routes are
//! wrapped with [`require_identity`].

/// 認証済みリクエストの主体
///
/// 中身は解決済みの `userId` のみ。セッション ID やメールアドレスは
/// ハンドラに渡さない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
}

impl Identity {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
        }
    }
}

/// 認可ゲートの拒否メッセージ
pub const UNAUTHORIZED_MESSAGE: &str = "Action requires authorization";

#[cfg(feature = "axum")]
mod http_support {
    use std::convert::Infallible;

    use axum::extract::{FromRequestParts, OptionalFromRequestParts, Request};
    use axum::http::request::Parts;
    use axum::middleware::Next;
    use axum::response::{IntoResponse, Response};

    use super::{Identity, UNAUTHORIZED_MESSAGE};
    use crate::error::app_error::AppError;

    impl<S> FromRequestParts<S> for Identity
    where
        S: Send + Sync,
    {
        type Rejection = AppError;

        async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
            parts
                .extensions
                .get::<Identity>()
                .cloned()
                .ok_or_else(|| AppError::unauthorized(UNAUTHORIZED_MESSAGE))
        }
    }

    impl<S> OptionalFromRequestParts<S> for Identity
    where
        S: Send + Sync,
    {
        type Rejection = Infallible;

        async fn from_request_parts(
            parts: &mut Parts,
            _state: &S,
        ) -> Result<Option<Self>, Self::Rejection> {
            Ok(parts.extensions.get::<Identity>().cloned())
        }
    }

    /// 認可ゲート
    ///
    /// `route_layer(axum::middleware::from_fn(require_identity))` として
    /// 書き込み系ルートに付与する。ID が無ければ 401、あればそのまま通す。
    pub async fn require_identity(req: Request, next: Next) -> Response {
        if req.extensions().get::<Identity>().is_none() {
            return AppError::unauthorized(UNAUTHORIZED_MESSAGE).into_response();
        }
        next.run(req).await
    }
}

#[cfg(feature = "axum")]
pub use http_support::require_identity;
