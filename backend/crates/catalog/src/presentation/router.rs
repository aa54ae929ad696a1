//! Catalog Router
//!
//! Reads are public. Every write goes through `require_identity`, so the
//! global `authenticate` middleware must run in front of this router.

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware::from_fn;
use axum::routing::{MethodRouter, get, patch, post};
use kernel::identity::require_identity;

use crate::domain::image::MAX_UPLOAD_BYTES;
use crate::domain::repository::{CatalogRepository, ImageBucket};
use crate::presentation::handlers::{self, CatalogAppState};

fn gated<S>(route: MethodRouter<S>) -> MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    route.route_layer(from_fn(require_identity))
}

pub fn catalog_router<R, B>(repo: Arc<R>, bucket: Arc<B>) -> Router
where
    R: CatalogRepository + Send + Sync + 'static,
    B: ImageBucket + Send + Sync + 'static,
{
    let state = CatalogAppState { repo, bucket };

    Router::new()
        .route(
            "/items",
            get(handlers::list_items::<R, B>).merge(gated(
                post(handlers::create_item::<R, B>)
                    .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
            )),
        )
        .route(
            "/items/{id}",
            get(handlers::get_item::<R, B>).merge(gated(
                patch(handlers::update_item::<R, B>).delete(handlers::delete_item::<R, B>),
            )),
        )
        .route(
            "/categories",
            get(handlers::list_categories::<R, B>)
                .merge(gated(post(handlers::create_category::<R, B>))),
        )
        .route(
            "/brands",
            get(handlers::list_brands::<R, B>).merge(gated(post(handlers::create_brand::<R, B>))),
        )
        .with_state(state)
}
