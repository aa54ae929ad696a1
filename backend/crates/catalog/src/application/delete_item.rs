//! Delete Item Use Case
//!
//! Hard delete. Bucket objects go after the rows are gone; a failed object
//! removal is logged and does not fail the request.

use std::sync::Arc;

use crate::domain::item::ItemId;
use crate::domain::repository::{CatalogRepository, ImageBucket};
use crate::error::{CatalogError, CatalogResult};

pub struct DeleteItemUseCase<R, B>
where
    R: CatalogRepository,
    B: ImageBucket,
{
    repo: Arc<R>,
    bucket: Arc<B>,
}

impl<R, B> DeleteItemUseCase<R, B>
where
    R: CatalogRepository + Send + Sync,
    B: ImageBucket + Send + Sync,
{
    pub fn new(repo: Arc<R>, bucket: Arc<B>) -> Self {
        Self { repo, bucket }
    }

    pub async fn execute(&self, id: ItemId) -> CatalogResult<()> {
        let objects = self
            .repo
            .delete_item(id)
            .await?
            .ok_or(CatalogError::ItemNotFound)?;

        for object_name in &objects {
            if let Err(e) = self.bucket.delete(object_name).await {
                tracing::warn!(item_id = id, object_name = %object_name, error = %e, "Failed to remove image object");
            }
        }

        tracing::info!(item_id = id, images = objects.len(), "Item deleted");
        Ok(())
    }
}
