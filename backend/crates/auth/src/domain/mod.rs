//! Domain Layer
//!
//! Contains claims, entities, value objects, and repository traits.

pub mod claims;
pub mod entity {
    pub mod user;
}
pub mod repository;
pub mod value_object;

// Re-exports
pub use claims::{IdentityClaims, RefreshClaims, SessionClaims};
pub use entity::user::UserCredentials;
pub use repository::{SessionStore, UserRepository};
