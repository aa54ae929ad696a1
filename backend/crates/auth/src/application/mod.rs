//! Application Layer
//!
//! Use cases and application services.

pub mod authenticate;
pub mod config;
pub mod renew_token;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use authenticate::{AuthenticateUseCase, Resolution};
pub use config::AuthConfig;
pub use renew_token::{RenewTokenUseCase, Renewal};
pub use session::{IssuedSession, open_session};
pub use sign_in::{SignInInput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpUseCase};
