//! Update Item Use Case

use std::sync::Arc;

use chrono::Utc;

use crate::domain::item::{ItemChanges, ItemId, ItemPatch};
use crate::domain::repository::CatalogRepository;
use crate::error::{CatalogError, CatalogResult};

pub struct UpdateItemUseCase<R>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateItemUseCase<R>
where
    R: CatalogRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// Soft-deleted items can still be patched, which is how they are
    /// restored.
    pub async fn execute(&self, id: ItemId, patch: ItemPatch) -> CatalogResult<ItemChanges> {
        let changes = ItemChanges::try_from(patch)?;

        let updated = self.repo.update_item(id, &changes, Utc::now()).await?;
        if updated == 0 {
            return Err(CatalogError::ItemNotFound);
        }

        tracing::info!(item_id = id, "Item updated");
        Ok(changes)
    }
}
