//! Item reads

use std::sync::Arc;

use crate::domain::item::{Item, ItemFilter, ItemId, ItemSummary};
use crate::domain::repository::CatalogRepository;
use crate::error::{CatalogError, CatalogResult};

pub struct QueryItemsUseCase<R>
where
    R: CatalogRepository,
{
    repo: Arc<R>,
}

impl<R> QueryItemsUseCase<R>
where
    R: CatalogRepository + Send + Sync,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn get(&self, id: ItemId) -> CatalogResult<Item> {
        self.repo
            .find_item(id)
            .await?
            .ok_or(CatalogError::ItemNotFound)
    }

    pub async fn list(&self, filter: &ItemFilter) -> CatalogResult<Vec<ItemSummary>> {
        self.repo.list_items(filter).await
    }
}
