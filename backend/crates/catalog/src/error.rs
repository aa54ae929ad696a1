//! Catalog Error Types
//!
//! Catalog-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Database errors go through the kernel
//! sqlx mapping, so constraint violations keep their client status.

use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

use crate::domain::image::{MAX_IMAGE_BYTES, MAX_IMAGES_PER_ITEM, MAX_UPLOAD_BYTES};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0}")]
    Validation(String),

    #[error("Include fields to be updated.")]
    EmptyPatch,

    #[error("Item not found")]
    ItemNotFound,

    #[error("A {kind} named {name} already exists.")]
    DuplicateLookup { kind: &'static str, name: String },

    #[error("Maximum request body size is {}MB", MAX_UPLOAD_BYTES >> 20)]
    PayloadTooLarge,

    #[error("You can upload up to {} images at once.", MAX_IMAGES_PER_ITEM)]
    TooManyImages,

    #[error(
        "The uploaded image is too big: {0}. Please use an image less than {max_mb}MB in size",
        max_mb = MAX_IMAGE_BYTES >> 20
    )]
    ImageTooLarge(String),

    #[error("The uploaded file format is not allowed: {0}. Please upload a JPEG or PNG image")]
    UnsupportedImage(String),

    #[error("Action requires authorization")]
    Unauthorized,

    /// Already mapped through the kernel sqlx conversion
    #[error("Database error: {0}")]
    Database(AppError),

    #[error("Image storage error: {0}")]
    Bucket(String),

    #[error("{0}")]
    App(AppError),
}

impl CatalogError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CatalogError::Validation(_)
            | CatalogError::EmptyPatch
            | CatalogError::TooManyImages => ErrorKind::BadRequest,
            CatalogError::ItemNotFound => ErrorKind::NotFound,
            CatalogError::DuplicateLookup { .. } => ErrorKind::Conflict,
            CatalogError::PayloadTooLarge => ErrorKind::PayloadTooLarge,
            CatalogError::ImageTooLarge(_) | CatalogError::UnsupportedImage(_) => {
                ErrorKind::UnprocessableEntity
            }
            CatalogError::Unauthorized => ErrorKind::Unauthorized,
            CatalogError::Database(err) | CatalogError::App(err) => err.kind(),
            CatalogError::Bucket(_) => ErrorKind::InternalServerError,
        }
    }

    pub fn to_app_error(&self) -> AppError {
        match self {
            CatalogError::Database(err) | CatalogError::App(err) => {
                AppError::new(err.kind(), err.message().to_string())
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    fn log(&self) {
        match self {
            CatalogError::Database(err) if err.is_server_error() => {
                tracing::error!(error = %err, "Catalog database error");
            }
            CatalogError::Bucket(msg) => {
                tracing::error!(message = %msg, "Image bucket error");
            }
            CatalogError::App(err) if err.is_server_error() => {
                tracing::error!(error = %err, "Catalog internal error");
            }
            _ => {
                tracing::debug!(error = %self, "Catalog request rejected");
            }
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        CatalogError::Database(AppError::from(err))
    }
}

impl From<AppError> for CatalogError {
    fn from(err: AppError) -> Self {
        CatalogError::App(err)
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::Bucket(err.to_string())
    }
}
