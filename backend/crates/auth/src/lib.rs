//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Claims, value objects, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - Redis / PostgreSQL / in-memory implementations
//! - `presentation/` - HTTP handlers, DTOs, router, middleware
//!
//! ## Features
//! - Sign up / sign in with email + password
//! - Short-lived stateless access tokens, long-lived refresh tokens backed
//!   by a server-side session record
//! - Silent access-token renewal in the global `authenticate` middleware
//! - Explicit session revocation on sign out
//!
//! ## Security Model
//! - Passwords hashed with Argon2id
//! - Tokens signed with HS256 only; other algorithms are rejected
//! - Refresh tokens never outlive their session record
//! - Tampered access tokens fail the request instead of downgrading

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemorySessionStore, InMemoryUserRepository, PgUserRepository, RedisSessionStore};
pub use presentation::router::{auth_middleware_state, auth_router};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod middleware {
    pub use crate::presentation::middleware::*;
}

#[cfg(test)]
mod tests;
