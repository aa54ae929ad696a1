//! Infrastructure Layer
//!
//! Session store and user repository implementations.

pub mod memory;
pub mod postgres;
pub mod redis_store;

pub use memory::{InMemorySessionStore, InMemoryUserRepository};
pub use postgres::PgUserRepository;
pub use redis_store::RedisSessionStore;
