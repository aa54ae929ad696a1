//! Infrastructure Layer
//!
//! PostgreSQL repository, filesystem bucket and in-memory doubles.

pub mod fs_bucket;
pub mod memory;
pub mod postgres;

pub use fs_bucket::FsImageBucket;
pub use memory::{InMemoryCatalogRepository, InMemoryImageBucket};
pub use postgres::PgCatalogRepository;
