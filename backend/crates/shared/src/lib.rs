//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the vocabulary every storefront crate agrees on:
//! - Unified error type and result alias
//! - Typed ID wrappers (session IDs)
//! - A JSON extractor whose rejections use the unified error
//! - The request identity injected by the auth middleware, and the
//!   authorization gate that consumes it
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
#[cfg(feature = "axum")]
pub mod extract;
pub mod id;
pub mod identity;
