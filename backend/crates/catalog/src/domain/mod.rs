//! Domain Layer
//!
//! Items, lookups, image inspection and the persistence seams.

pub mod image;
pub mod item;
pub mod lookup;
pub mod repository;

pub use image::{ImageFormat, ImageUpload, RawImage};
pub use item::{Item, ItemChanges, ItemDraft, ItemFilter, ItemId, ItemPatch, ItemSummary, NewItem};
pub use lookup::{Lookup, LookupKind};
pub use repository::{CatalogRepository, ImageBucket};
