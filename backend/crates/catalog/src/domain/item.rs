//! Item entities, the write-side inputs and the list filter

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, CatalogResult};

pub type ItemId = i64;

pub const DEFAULT_LIST_LIMIT: i64 = 10;
pub const MAX_LIST_LIMIT: i64 = 50;

/// A single item with its lookup names and ordered image URLs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    pub user_id: i64,
    pub category_id: i64,
    pub category_name: String,
    pub brand_id: i64,
    pub brand_name: String,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: Option<DateTime<Utc>>,
    pub images: Vec<String>,
}

/// Row of the item listing; only the first image is carried
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: ItemId,
    pub user_id: i64,
    pub category_name: String,
    pub brand_id: i64,
    pub brand_name: String,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub thumbnail: Option<String>,
}

impl ItemSummary {
    /// Discounted price when set, else the list price
    pub fn effective_price(&self) -> i64 {
        self.discounted_price.unwrap_or(self.price)
    }
}

/// Item payload of a create request, before validation
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    #[serde(default)]
    pub category_id: i64,
    #[serde(default)]
    pub brand_id: i64,
    #[serde(default)]
    pub price: i64,
    #[serde(default)]
    pub discounted_price: Option<i64>,
    #[serde(default)]
    pub description: String,
}

/// Validated item ready for insertion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewItem {
    pub user_id: i64,
    pub category_id: i64,
    pub brand_id: i64,
    pub price: i64,
    pub discounted_price: Option<i64>,
    pub description: String,
}

impl ItemDraft {
    pub fn validate(self, user_id: i64) -> CatalogResult<NewItem> {
        if self.category_id <= 0 {
            return Err(CatalogError::Validation("CategoryId field can't be empty.".into()));
        }
        if self.brand_id <= 0 {
            return Err(CatalogError::Validation("BrandId field can't be empty.".into()));
        }
        if self.price <= 0 {
            return Err(CatalogError::Validation("Price field can't be empty.".into()));
        }
        let discounted_price = match self.discounted_price {
            None | Some(0) => None,
            Some(d) if d > 0 && d < self.price => Some(d),
            Some(_) => {
                return Err(CatalogError::Validation(
                    "Discounted price must be positive and below the price.".into(),
                ));
            }
        };
        let description = self.description.trim();
        if description.is_empty() {
            return Err(CatalogError::Validation("Description field can't be empty.".into()));
        }

        Ok(NewItem {
            user_id,
            category_id: self.category_id,
            brand_id: self.brand_id,
            price: self.price,
            discounted_price,
            description: description.to_string(),
        })
    }
}

/// Partial update as sent by the client
///
/// Zero and empty values mean "leave unchanged". `discount` and
/// `change_deleted` are switches: when set, the paired value is applied and
/// zero clears it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ItemPatch {
    pub category_id: i64,
    pub brand_id: i64,
    pub price: i64,
    pub discount: bool,
    pub discounted_price: i64,
    pub description: String,
    pub change_deleted: bool,
    /// Unix seconds
    pub deleted_at: i64,
}

/// Column changes derived from an [`ItemPatch`]
///
/// The outer `Option` says whether a column is touched; an inner `None`
/// writes NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemChanges {
    pub category_id: Option<i64>,
    pub brand_id: Option<i64>,
    pub price: Option<i64>,
    pub discounted_price: Option<Option<i64>>,
    pub description: Option<String>,
    pub deleted_at: Option<Option<DateTime<Utc>>>,
}

impl ItemChanges {
    pub fn is_empty(&self) -> bool {
        *self == ItemChanges::default()
    }
}

impl TryFrom<ItemPatch> for ItemChanges {
    type Error = CatalogError;

    fn try_from(patch: ItemPatch) -> CatalogResult<Self> {
        let positive = |value: i64, field: &str| -> CatalogResult<Option<i64>> {
            match value {
                0 => Ok(None),
                v if v > 0 => Ok(Some(v)),
                _ => Err(CatalogError::Validation(format!("{} must be positive.", field))),
            }
        };

        let mut changes = ItemChanges {
            category_id: positive(patch.category_id, "CategoryId")?,
            brand_id: positive(patch.brand_id, "BrandId")?,
            price: positive(patch.price, "Price")?,
            ..ItemChanges::default()
        };

        if patch.discount {
            let discounted = positive(patch.discounted_price, "DiscountedPrice")?;
            if let (Some(d), Some(p)) = (discounted, changes.price) {
                if d >= p {
                    return Err(CatalogError::Validation(
                        "Discounted price must be positive and below the price.".into(),
                    ));
                }
            }
            changes.discounted_price = Some(discounted);
        }

        let description = patch.description.trim();
        if !description.is_empty() {
            changes.description = Some(description.to_string());
        }

        if patch.change_deleted {
            let deleted_at = match patch.deleted_at {
                0 => None,
                secs => Some(Utc.timestamp_opt(secs, 0).single().ok_or_else(|| {
                    CatalogError::Validation("DeletedAt is not a valid timestamp.".into())
                })?),
            };
            changes.deleted_at = Some(deleted_at);
        }

        if changes.is_empty() {
            return Err(CatalogError::EmptyPatch);
        }
        Ok(changes)
    }
}

/// Exclusive bounds on the effective price
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceRange {
    pub low: i64,
    pub high: i64,
}

impl PriceRange {
    pub fn contains(&self, price: i64) -> bool {
        price > self.low && price < self.high
    }
}

/// Listing filter parsed from the query string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFilter {
    pub brands: Vec<i64>,
    pub prices: Option<PriceRange>,
    pub limit: i64,
}

impl Default for ItemFilter {
    fn default() -> Self {
        Self {
            brands: Vec::new(),
            prices: None,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

impl ItemFilter {
    /// `brand=1,2,3` drops non-numeric entries; `prices=low-high` and
    /// `limit` must be well formed.
    pub fn parse(
        brand: Option<&str>,
        prices: Option<&str>,
        limit: Option<&str>,
    ) -> CatalogResult<Self> {
        let brands = brand
            .map(|raw| {
                raw.split(',')
                    .filter_map(|part| part.trim().parse::<i64>().ok())
                    .collect()
            })
            .unwrap_or_default();

        let prices = prices
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                let malformed =
                    || CatalogError::Validation(format!("Malformed price range: {}", raw));
                let (low, high) = raw.split_once('-').ok_or_else(malformed)?;
                Ok::<_, CatalogError>(PriceRange {
                    low: low.trim().parse().map_err(|_| malformed())?,
                    high: high.trim().parse().map_err(|_| malformed())?,
                })
            })
            .transpose()?;

        let limit = match limit.filter(|raw| !raw.is_empty()) {
            None => DEFAULT_LIST_LIMIT,
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => n.min(MAX_LIST_LIMIT),
                _ => return Err(CatalogError::Validation(format!("Malformed limit: {}", raw))),
            },
        };

        Ok(Self {
            brands,
            prices,
            limit,
        })
    }

    /// Whether a listed item passes the brand and price conditions
    pub fn matches(&self, item: &ItemSummary) -> bool {
        (self.brands.is_empty() || self.brands.contains(&item.brand_id))
            && self
                .prices
                .is_none_or(|range| range.contains(item.effective_price()))
    }
}
