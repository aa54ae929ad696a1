//! Catalog Backend Module
//!
//! Items for sale, their images, and the category / brand lookup tables.
//!
//! Clean Architecture structure:
//! - `domain/` - Items, image inspection, lookups, repository traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL, filesystem bucket, in-memory doubles
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! Writes require an identity resolved by the auth middleware; reads are
//! public.

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

pub use error::{CatalogError, CatalogResult};
pub use infra::{FsImageBucket, InMemoryCatalogRepository, InMemoryImageBucket, PgCatalogRepository};
pub use presentation::router::catalog_router;
