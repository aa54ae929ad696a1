//! In-memory implementations
//!
//! Used by tests and local runs without PostgreSQL. The repository enforces
//! the same foreign keys and unique names as the schema.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{DateTime, Utc};
use kernel::error::app_error::AppError;
use tokio::sync::RwLock;

use crate::domain::item::{Item, ItemChanges, ItemFilter, ItemId, ItemSummary, NewItem};
use crate::domain::lookup::{Lookup, LookupKind};
use crate::domain::repository::{CatalogRepository, ImageBucket};
use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone)]
struct StoredItem {
    item: NewItem,
    created_at: DateTime<Utc>,
    modified_at: Option<DateTime<Utc>>,
    deleted_at: Option<DateTime<Utc>>,
    /// (display order, url, object name)
    images: Vec<(i32, String, String)>,
}

#[derive(Default)]
struct CatalogState {
    next_item_id: ItemId,
    items: BTreeMap<ItemId, StoredItem>,
    lookups: HashMap<LookupKind, Vec<Lookup>>,
}

impl CatalogState {
    fn lookup_name(&self, kind: LookupKind, id: i64) -> Option<&str> {
        self.lookups
            .get(&kind)?
            .iter()
            .find(|l| l.id == id)
            .map(|l| l.name.as_str())
    }

    fn check_references(&self, category_id: Option<i64>, brand_id: Option<i64>) -> CatalogResult<()> {
        let missing = category_id
            .is_some_and(|id| self.lookup_name(LookupKind::Category, id).is_none())
            || brand_id.is_some_and(|id| self.lookup_name(LookupKind::Brand, id).is_none());
        if missing {
            return Err(AppError::bad_request("Referenced record does not exist").into());
        }
        Ok(())
    }

    fn to_item(&self, id: ItemId, stored: &StoredItem) -> Item {
        let mut images = stored.images.clone();
        images.sort_by_key(|(order, _, _)| *order);
        Item {
            id,
            user_id: stored.item.user_id,
            category_id: stored.item.category_id,
            category_name: self
                .lookup_name(LookupKind::Category, stored.item.category_id)
                .unwrap_or_default()
                .to_string(),
            brand_id: stored.item.brand_id,
            brand_name: self
                .lookup_name(LookupKind::Brand, stored.item.brand_id)
                .unwrap_or_default()
                .to_string(),
            price: stored.item.price,
            discounted_price: stored.item.discounted_price,
            description: stored.item.description.clone(),
            created_at: stored.created_at,
            modified_at: stored.modified_at,
            images: images.into_iter().map(|(_, url, _)| url).collect(),
        }
    }
}

#[derive(Clone, Default)]
pub struct InMemoryCatalogRepository {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalogRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored items, soft-deleted ones included
    pub async fn item_count(&self) -> usize {
        self.state.read().await.items.len()
    }
}

impl CatalogRepository for InMemoryCatalogRepository {
    async fn insert_item(&self, item: &NewItem) -> CatalogResult<ItemId> {
        let mut state = self.state.write().await;
        state.check_references(Some(item.category_id), Some(item.brand_id))?;

        state.next_item_id += 1;
        let id = state.next_item_id;
        state.items.insert(
            id,
            StoredItem {
                item: item.clone(),
                created_at: Utc::now(),
                modified_at: None,
                deleted_at: None,
                images: Vec::new(),
            },
        );
        Ok(id)
    }

    async fn attach_image(
        &self,
        item_id: ItemId,
        url: &str,
        object_name: &str,
        display_order: i32,
    ) -> CatalogResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .items
            .get_mut(&item_id)
            .ok_or_else(|| AppError::bad_request("Referenced record does not exist"))?;
        stored
            .images
            .push((display_order, url.to_string(), object_name.to_string()));
        Ok(())
    }

    async fn find_item(&self, id: ItemId) -> CatalogResult<Option<Item>> {
        let state = self.state.read().await;
        Ok(state
            .items
            .get(&id)
            .filter(|stored| stored.deleted_at.is_none())
            .map(|stored| state.to_item(id, stored)))
    }

    async fn list_items(&self, filter: &ItemFilter) -> CatalogResult<Vec<ItemSummary>> {
        let state = self.state.read().await;
        let mut items: Vec<ItemSummary> = state
            .items
            .iter()
            .filter(|(_, stored)| stored.deleted_at.is_none())
            .map(|(id, stored)| {
                let item = state.to_item(*id, stored);
                ItemSummary {
                    id: item.id,
                    user_id: item.user_id,
                    category_name: item.category_name,
                    brand_id: item.brand_id,
                    brand_name: item.brand_name,
                    price: item.price,
                    discounted_price: item.discounted_price,
                    description: item.description,
                    created_at: item.created_at,
                    thumbnail: stored
                        .images
                        .iter()
                        .find(|(order, _, _)| *order == 0)
                        .map(|(_, url, _)| url.clone()),
                }
            })
            .filter(|summary| filter.matches(summary))
            .collect();

        items.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        items.truncate(usize::try_from(filter.limit).unwrap_or(0));
        Ok(items)
    }

    async fn update_item(
        &self,
        id: ItemId,
        changes: &ItemChanges,
        modified_at: DateTime<Utc>,
    ) -> CatalogResult<u64> {
        let mut state = self.state.write().await;
        if !state.items.contains_key(&id) {
            return Ok(0);
        }
        state.check_references(changes.category_id, changes.brand_id)?;

        let Some(stored) = state.items.get_mut(&id) else {
            return Ok(0);
        };
        stored.modified_at = Some(modified_at);
        if let Some(category_id) = changes.category_id {
            stored.item.category_id = category_id;
        }
        if let Some(brand_id) = changes.brand_id {
            stored.item.brand_id = brand_id;
        }
        if let Some(price) = changes.price {
            stored.item.price = price;
        }
        if let Some(discounted_price) = changes.discounted_price {
            stored.item.discounted_price = discounted_price;
        }
        if let Some(description) = &changes.description {
            stored.item.description = description.clone();
        }
        if let Some(deleted_at) = changes.deleted_at {
            stored.deleted_at = deleted_at;
        }
        Ok(1)
    }

    async fn delete_item(&self, id: ItemId) -> CatalogResult<Option<Vec<String>>> {
        let mut state = self.state.write().await;
        Ok(state.items.remove(&id).map(|stored| {
            stored
                .images
                .into_iter()
                .map(|(_, _, object_name)| object_name)
                .collect()
        }))
    }

    async fn list_lookups(&self, kind: LookupKind) -> CatalogResult<Vec<Lookup>> {
        let state = self.state.read().await;
        let mut lookups = state.lookups.get(&kind).cloned().unwrap_or_default();
        lookups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(lookups)
    }

    async fn insert_lookup(&self, kind: LookupKind, name: &str) -> CatalogResult<Lookup> {
        let mut state = self.state.write().await;
        let entries = state.lookups.entry(kind).or_default();
        if entries.iter().any(|l| l.name == name) {
            return Err(CatalogError::DuplicateLookup {
                kind: kind.label(),
                name: name.to_string(),
            });
        }
        let lookup = Lookup {
            id: entries.len() as i64 + 1,
            name: name.to_string(),
        };
        entries.push(lookup.clone());
        Ok(lookup)
    }
}

/// Bucket that keeps objects in memory
///
/// `failing_after(n)` accepts `n` uploads and rejects the rest.
#[derive(Clone, Default)]
pub struct InMemoryImageBucket {
    objects: Arc<RwLock<HashMap<String, (Vec<u8>, String)>>>,
    uploads: Arc<AtomicUsize>,
    fail_after: Option<usize>,
}

impl InMemoryImageBucket {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_after(uploads: usize) -> Self {
        Self {
            fail_after: Some(uploads),
            ..Self::default()
        }
    }

    pub async fn object_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    pub async fn content_type(&self, object_name: &str) -> Option<String> {
        self.objects
            .read()
            .await
            .get(object_name)
            .map(|(_, content_type)| content_type.clone())
    }
}

impl ImageBucket for InMemoryImageBucket {
    async fn upload(
        &self,
        object_name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> CatalogResult<String> {
        let attempt = self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail_after.is_some_and(|limit| attempt >= limit) {
            return Err(CatalogError::Bucket("bucket unavailable".into()));
        }
        self.objects
            .write()
            .await
            .insert(object_name.to_string(), (bytes, content_type.to_string()));
        Ok(format!("/images/{}", object_name))
    }

    async fn delete(&self, object_name: &str) -> CatalogResult<()> {
        self.objects.write().await.remove(object_name);
        Ok(())
    }
}
