//! Category and brand lookup tables

use serde::Serialize;

use crate::error::{CatalogError, CatalogResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupKind {
    Category,
    Brand,
}

impl LookupKind {
    pub fn table(self) -> &'static str {
        match self {
            LookupKind::Category => "categories",
            LookupKind::Brand => "brands",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LookupKind::Category => "category",
            LookupKind::Brand => "brand",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Lookup {
    pub id: i64,
    pub name: String,
}

/// Trimmed, non-blank lookup name
pub fn lookup_name(raw: &str) -> CatalogResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(CatalogError::Validation("Name field can't be empty.".into()));
    }
    if name.chars().count() > 100 {
        return Err(CatalogError::Validation("Name is too long.".into()));
    }
    Ok(name.to_string())
}
