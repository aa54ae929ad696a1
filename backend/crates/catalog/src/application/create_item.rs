//! Create Item Use Case
//!
//! Every image is inspected before anything is written. Images are then
//! uploaded in request order and linked with their upload index as display
//! order. A failed upload removes the half-created item again.

use std::sync::Arc;

use crate::domain::image::{ImageUpload, RawImage, inspect_all};
use crate::domain::item::{Item, ItemDraft, ItemId};
use crate::domain::repository::{CatalogRepository, ImageBucket};
use crate::error::{CatalogError, CatalogResult};

pub struct CreateItemUseCase<R, B>
where
    R: CatalogRepository,
    B: ImageBucket,
{
    repo: Arc<R>,
    bucket: Arc<B>,
}

impl<R, B> CreateItemUseCase<R, B>
where
    R: CatalogRepository + Send + Sync,
    B: ImageBucket + Send + Sync,
{
    pub fn new(repo: Arc<R>, bucket: Arc<B>) -> Self {
        Self { repo, bucket }
    }

    pub async fn execute(
        &self,
        user_id: i64,
        draft: ItemDraft,
        images: Vec<RawImage>,
    ) -> CatalogResult<Item> {
        let images = inspect_all(images)?;
        let item = draft.validate(user_id)?;

        let item_id = self.repo.insert_item(&item).await?;

        let mut stored = Vec::with_capacity(images.len());
        for (index, image) in images.into_iter().enumerate() {
            if let Err(e) = self.store_image(item_id, index, image, &mut stored).await {
                self.roll_back(item_id, &stored).await;
                return Err(e);
            }
        }

        tracing::info!(
            item_id,
            user_id,
            images = stored.len(),
            "Item created"
        );

        self.repo
            .find_item(item_id)
            .await?
            .ok_or(CatalogError::ItemNotFound)
    }

    async fn store_image(
        &self,
        item_id: ItemId,
        index: usize,
        image: ImageUpload,
        stored: &mut Vec<String>,
    ) -> CatalogResult<()> {
        let object_name = image.object_name();
        let url = self
            .bucket
            .upload(&object_name, image.bytes, image.format.content_type())
            .await?;
        stored.push(object_name.clone());

        let display_order = i32::try_from(index)
            .map_err(|_| CatalogError::Validation("Too many images.".into()))?;
        self.repo
            .attach_image(item_id, &url, &object_name, display_order)
            .await
    }

    async fn roll_back(&self, item_id: ItemId, stored: &[String]) {
        if let Err(e) = self.repo.delete_item(item_id).await {
            tracing::warn!(item_id, error = %e, "Failed to remove partially created item");
        }
        for object_name in stored {
            if let Err(e) = self.bucket.delete(object_name).await {
                tracing::warn!(object_name = %object_name, error = %e, "Failed to remove orphaned image");
            }
        }
    }
}
