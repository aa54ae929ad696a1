//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Signed, time-bound tokens (HS256 JWT)
//! - Password hashing (Argon2id)
//! - Cookie building and parsing

pub mod cookie;
pub mod password;
pub mod token;
