//! Application Layer
//!
//! Use cases over the catalog repository and image bucket.

pub mod create_item;
pub mod delete_item;
pub mod lookups;
pub mod query_items;
pub mod update_item;

// Re-exports
pub use create_item::CreateItemUseCase;
pub use delete_item::DeleteItemUseCase;
pub use lookups::LookupUseCase;
pub use query_items::QueryItemsUseCase;
pub use update_item::UpdateItemUseCase;
