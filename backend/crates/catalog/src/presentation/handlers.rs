//! HTTP Handlers

use std::sync::Arc;

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::extract::Json;
use kernel::identity::Identity;

use crate::application::{
    CreateItemUseCase, DeleteItemUseCase, LookupUseCase, QueryItemsUseCase, UpdateItemUseCase,
};
use crate::domain::image::{MAX_IMAGES_PER_ITEM, RawImage};
use crate::domain::item::{ItemDraft, ItemFilter, ItemId, ItemPatch};
use crate::domain::lookup::LookupKind;
use crate::domain::repository::{CatalogRepository, ImageBucket};
use crate::error::{CatalogError, CatalogResult};
use crate::presentation::dto::{DataResponse, ListItemsQuery, LookupRequest, MessageResponse};

/// Shared state for catalog handlers
pub struct CatalogAppState<R, B>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub bucket: Arc<B>,
}

impl<R, B> Clone for CatalogAppState<R, B>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            repo: self.repo.clone(),
            bucket: self.bucket.clone(),
        }
    }
}

/// Users table ids are numeric; anything else cannot own an item
fn owner_id(identity: &Identity) -> CatalogResult<i64> {
    identity
        .user_id
        .parse()
        .map_err(|_| CatalogError::Unauthorized)
}

fn multipart_error(err: MultipartError) -> CatalogError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CatalogError::PayloadTooLarge
    } else {
        CatalogError::Validation(err.body_text())
    }
}

/// Split the form into the `data` JSON part and the `imageFile` parts
async fn read_item_form(mut multipart: Multipart) -> CatalogResult<(ItemDraft, Vec<RawImage>)> {
    let mut data = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("data") => {
                data = Some(field.text().await.map_err(multipart_error)?);
            }
            Some("imageFile") => {
                if images.len() == MAX_IMAGES_PER_ITEM {
                    return Err(CatalogError::TooManyImages);
                }
                let file_name = field.file_name().unwrap_or("image").to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                images.push(RawImage {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            _ => {}
        }
    }

    let data = data.ok_or_else(|| CatalogError::Validation("Missing item data.".into()))?;
    let draft = serde_json::from_str(&data)
        .map_err(|e| CatalogError::Validation(format!("Malformed item data: {}", e)))?;
    Ok((draft, images))
}

// ============================================================================
// Items
// ============================================================================

/// POST /api/catalog/items
pub async fn create_item<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    identity: Identity,
    multipart: Multipart,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    let user_id = owner_id(&identity)?;
    let (draft, images) = read_item_form(multipart).await?;

    let use_case = CreateItemUseCase::new(state.repo.clone(), state.bucket.clone());
    let item = use_case.execute(user_id, draft, images).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Successful entry.",
            data: item,
        }),
    ))
}

/// GET /api/catalog/items/{id}
pub async fn get_item<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    Path(id): Path<ItemId>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    let item = QueryItemsUseCase::new(state.repo.clone()).get(id).await?;
    Ok(Json(DataResponse::success(item)))
}

/// GET /api/catalog/items
pub async fn list_items<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    Query(query): Query<ListItemsQuery>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    let filter = ItemFilter::parse(
        query.brand.as_deref(),
        query.prices.as_deref(),
        query.limit.as_deref(),
    )?;
    let items = QueryItemsUseCase::new(state.repo.clone())
        .list(&filter)
        .await?;
    Ok(Json(DataResponse::success(items)))
}

/// PATCH /api/catalog/items/{id}
pub async fn update_item<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    Path(id): Path<ItemId>,
    Json(patch): Json<ItemPatch>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    UpdateItemUseCase::new(state.repo.clone())
        .execute(id, patch)
        .await?;
    Ok(Json(MessageResponse {
        message: "Item updated.".to_string(),
    }))
}

/// DELETE /api/catalog/items/{id}
pub async fn delete_item<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    Path(id): Path<ItemId>,
) -> CatalogResult<StatusCode>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    DeleteItemUseCase::new(state.repo.clone(), state.bucket.clone())
        .execute(id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Categories / Brands
// ============================================================================

async fn list_lookups<R, B>(
    state: CatalogAppState<R, B>,
    kind: LookupKind,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    let lookups = LookupUseCase::new(state.repo.clone(), kind).list().await?;
    Ok(Json(DataResponse::success(lookups)))
}

async fn create_lookup<R, B>(
    state: CatalogAppState<R, B>,
    kind: LookupKind,
    req: LookupRequest,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    let lookup = LookupUseCase::new(state.repo.clone(), kind)
        .create(&req.name)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            message: "Successful entry.",
            data: lookup,
        }),
    ))
}

/// GET /api/catalog/categories
pub async fn list_categories<R, B>(
    State(state): State<CatalogAppState<R, B>>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    list_lookups(state, LookupKind::Category).await
}

/// POST /api/catalog/categories
pub async fn create_category<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    Json(req): Json<LookupRequest>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    create_lookup(state, LookupKind::Category, req).await
}

/// GET /api/catalog/brands
pub async fn list_brands<R, B>(
    State(state): State<CatalogAppState<R, B>>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    list_lookups(state, LookupKind::Brand).await
}

/// POST /api/catalog/brands
pub async fn create_brand<R, B>(
    State(state): State<CatalogAppState<R, B>>,
    Json(req): Json<LookupRequest>,
) -> CatalogResult<impl IntoResponse>
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    create_lookup(state, LookupKind::Brand, req).await
}
