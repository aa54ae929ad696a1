//! Repository Traits
//!
//! Interfaces for catalog persistence and image storage. Implementations
//! are in the infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::item::{Item, ItemChanges, ItemFilter, ItemId, ItemSummary, NewItem};
use crate::domain::lookup::{Lookup, LookupKind};
use crate::error::CatalogResult;

#[trait_variant::make(CatalogRepository: Send)]
pub trait LocalCatalogRepository {
    /// Insert an item and return its id.
    /// Unknown category or brand ids fail with a 400.
    async fn insert_item(&self, item: &NewItem) -> CatalogResult<ItemId>;

    /// Record an uploaded image and link it to an item at `display_order`
    async fn attach_image(
        &self,
        item_id: ItemId,
        url: &str,
        object_name: &str,
        display_order: i32,
    ) -> CatalogResult<()>;

    /// Non-deleted item with ordered image URLs
    async fn find_item(&self, id: ItemId) -> CatalogResult<Option<Item>>;

    async fn list_items(&self, filter: &ItemFilter) -> CatalogResult<Vec<ItemSummary>>;

    /// Apply changes and stamp `modified_at`. Returns the affected row count.
    async fn update_item(
        &self,
        id: ItemId,
        changes: &ItemChanges,
        modified_at: DateTime<Utc>,
    ) -> CatalogResult<u64>;

    /// Hard delete an item with its image rows.
    /// Returns the bucket object names of the removed images, `None` when
    /// no item matched.
    async fn delete_item(&self, id: ItemId) -> CatalogResult<Option<Vec<String>>>;

    /// All entries, ordered by name
    async fn list_lookups(&self, kind: LookupKind) -> CatalogResult<Vec<Lookup>>;

    /// Fails with `CatalogError::DuplicateLookup` on a taken name
    async fn insert_lookup(&self, kind: LookupKind, name: &str) -> CatalogResult<Lookup>;
}

/// Object storage for item images
#[trait_variant::make(ImageBucket: Send)]
pub trait LocalImageBucket {
    /// Store an object and return its public URL
    async fn upload(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> CatalogResult<String>;

    /// Remove an object. Missing objects are not an error.
    async fn delete(&self, object_name: &str) -> CatalogResult<()>;
}
