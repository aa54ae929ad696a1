//! Uploaded item images
//!
//! Images are accepted only when their leading bytes identify them as JPEG
//! or PNG; the client-declared content type is ignored.

use uuid::Uuid;

use crate::error::{CatalogError, CatalogResult};

/// Whole multipart request body
pub const MAX_UPLOAD_BYTES: usize = 10 << 20;
/// Single image
pub const MAX_IMAGE_BYTES: usize = 2 << 20;
pub const MAX_IMAGES_PER_ITEM: usize = 20;

const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF];
const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

impl ImageFormat {
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(JPEG_MAGIC) {
            Some(ImageFormat::Jpeg)
        } else if bytes.starts_with(PNG_MAGIC) {
            Some(ImageFormat::Png)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Png => "png",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Png => "image/png",
        }
    }
}

/// A file part as received, not yet inspected
#[derive(Debug, Clone)]
pub struct RawImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// An image that passed inspection
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Fresh bucket object name, `items/{uuid}.{ext}`
    pub fn object_name(&self) -> String {
        format!("items/{}.{}", Uuid::new_v4(), self.format.extension())
    }
}

/// Check size and format of one image
pub fn inspect(raw: RawImage) -> CatalogResult<ImageUpload> {
    if raw.bytes.len() > MAX_IMAGE_BYTES {
        return Err(CatalogError::ImageTooLarge(raw.file_name));
    }
    match ImageFormat::sniff(&raw.bytes) {
        Some(format) => Ok(ImageUpload {
            format,
            bytes: raw.bytes,
        }),
        None => Err(CatalogError::UnsupportedImage(raw.file_name)),
    }
}

/// Check every image of a request; the first failure rejects them all
pub fn inspect_all(raw: Vec<RawImage>) -> CatalogResult<Vec<ImageUpload>> {
    if raw.len() > MAX_IMAGES_PER_ITEM {
        return Err(CatalogError::TooManyImages);
    }
    raw.into_iter().map(inspect).collect()
}
