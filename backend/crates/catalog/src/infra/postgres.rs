//! PostgreSQL catalog repository
//!
//! Listing and patch statements are assembled with `QueryBuilder`; every
//! value is bound, only fixed fragments are pushed as SQL.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::domain::item::{Item, ItemChanges, ItemFilter, ItemId, ItemSummary, NewItem};
use crate::domain::lookup::{Lookup, LookupKind};
use crate::domain::repository::CatalogRepository;
use crate::error::{CatalogError, CatalogResult};

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    user_id: i64,
    category_id: i64,
    category_name: String,
    brand_id: i64,
    brand_name: String,
    price: i64,
    discounted_price: Option<i64>,
    description: String,
    created_at: DateTime<Utc>,
    modified_at: Option<DateTime<Utc>>,
}

impl ItemRow {
    fn into_item(self, images: Vec<String>) -> Item {
        Item {
            id: self.id,
            user_id: self.user_id,
            category_id: self.category_id,
            category_name: self.category_name,
            brand_id: self.brand_id,
            brand_name: self.brand_name,
            price: self.price,
            discounted_price: self.discounted_price,
            description: self.description,
            created_at: self.created_at,
            modified_at: self.modified_at,
            images,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    user_id: i64,
    category_name: String,
    brand_id: i64,
    brand_name: String,
    price: i64,
    discounted_price: Option<i64>,
    description: String,
    created_at: DateTime<Utc>,
    thumbnail: Option<String>,
}

impl From<SummaryRow> for ItemSummary {
    fn from(row: SummaryRow) -> Self {
        ItemSummary {
            id: row.id,
            user_id: row.user_id,
            category_name: row.category_name,
            brand_id: row.brand_id,
            brand_name: row.brand_name,
            price: row.price,
            discounted_price: row.discounted_price,
            description: row.description,
            created_at: row.created_at,
            thumbnail: row.thumbnail,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LookupRow {
    id: i64,
    name: String,
}

impl From<LookupRow> for Lookup {
    fn from(row: LookupRow) -> Self {
        Lookup {
            id: row.id,
            name: row.name,
        }
    }
}

impl CatalogRepository for PgCatalogRepository {
    async fn insert_item(&self, item: &NewItem) -> CatalogResult<ItemId> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO items (user_id, category_id, brand_id, price, discounted_price, description)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(item.user_id)
        .bind(item.category_id)
        .bind(item.brand_id)
        .bind(item.price)
        .bind(item.discounted_price)
        .bind(&item.description)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn attach_image(
        &self,
        item_id: ItemId,
        url: &str,
        object_name: &str,
        display_order: i32,
    ) -> CatalogResult<()> {
        let mut tx = self.pool.begin().await?;

        let image_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO images (url, object_name)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(url)
        .bind(object_name)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO items_images (item_id, image_id, display_order)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(item_id)
        .bind(image_id)
        .bind(display_order)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_item(&self, id: ItemId) -> CatalogResult<Option<Item>> {
        let row = sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT i.id, i.user_id,
                   i.category_id, c.name AS category_name,
                   i.brand_id, b.name AS brand_name,
                   i.price, i.discounted_price, i.description,
                   i.created_at, i.modified_at
            FROM items i
            JOIN categories c ON i.category_id = c.id
            JOIN brands b ON i.brand_id = b.id
            WHERE i.id = $1 AND i.deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let images = sqlx::query_scalar::<_, String>(
            r#"
            SELECT img.url
            FROM items_images ii
            JOIN images img ON ii.image_id = img.id
            WHERE ii.item_id = $1
            ORDER BY ii.display_order ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(row.into_item(images)))
    }

    async fn list_items(&self, filter: &ItemFilter) -> CatalogResult<Vec<ItemSummary>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            r#"
            SELECT i.id, i.user_id, c.name AS category_name,
                   i.brand_id, b.name AS brand_name,
                   i.price, i.discounted_price, i.description, i.created_at,
                   img.url AS thumbnail
            FROM items i
            JOIN categories c ON i.category_id = c.id
            JOIN brands b ON i.brand_id = b.id
            LEFT JOIN items_images ii ON ii.item_id = i.id AND ii.display_order = 0
            LEFT JOIN images img ON ii.image_id = img.id
            WHERE i.deleted_at IS NULL
            "#,
        );

        if !filter.brands.is_empty() {
            qb.push(" AND i.brand_id IN (");
            let mut ids = qb.separated(", ");
            for brand_id in &filter.brands {
                ids.push_bind(*brand_id);
            }
            ids.push_unseparated(")");
        }

        if let Some(range) = filter.prices {
            qb.push(" AND COALESCE(i.discounted_price, i.price) > ")
                .push_bind(range.low)
                .push(" AND COALESCE(i.discounted_price, i.price) < ")
                .push_bind(range.high);
        }

        qb.push(" ORDER BY i.created_at DESC, i.id DESC LIMIT ")
            .push_bind(filter.limit);

        let rows = qb
            .build_query_as::<SummaryRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(ItemSummary::from).collect())
    }

    async fn update_item(
        &self,
        id: ItemId,
        changes: &ItemChanges,
        modified_at: DateTime<Utc>,
    ) -> CatalogResult<u64> {
        let mut qb = QueryBuilder::<Postgres>::new("UPDATE items SET modified_at = ");
        qb.push_bind(modified_at);

        if let Some(category_id) = changes.category_id {
            qb.push(", category_id = ").push_bind(category_id);
        }
        if let Some(brand_id) = changes.brand_id {
            qb.push(", brand_id = ").push_bind(brand_id);
        }
        if let Some(price) = changes.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(discounted_price) = changes.discounted_price {
            qb.push(", discounted_price = ").push_bind(discounted_price);
        }
        if let Some(description) = &changes.description {
            qb.push(", description = ").push_bind(description.clone());
        }
        if let Some(deleted_at) = changes.deleted_at {
            qb.push(", deleted_at = ").push_bind(deleted_at);
        }

        qb.push(" WHERE id = ").push_bind(id);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn delete_item(&self, id: ItemId) -> CatalogResult<Option<Vec<String>>> {
        let mut tx = self.pool.begin().await?;

        let objects = sqlx::query_scalar::<_, String>(
            r#"
            DELETE FROM images
            WHERE id IN (SELECT image_id FROM items_images WHERE item_id = $1)
            RETURNING object_name
            "#,
        )
        .bind(id)
        .fetch_all(&mut *tx)
        .await?;

        let deleted = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        if deleted == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        tx.commit().await?;
        Ok(Some(objects))
    }

    async fn list_lookups(&self, kind: LookupKind) -> CatalogResult<Vec<Lookup>> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT id, name FROM ");
        qb.push(kind.table()).push(" ORDER BY name ASC");

        let rows = qb
            .build_query_as::<LookupRow>()
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Lookup::from).collect())
    }

    async fn insert_lookup(&self, kind: LookupKind, name: &str) -> CatalogResult<Lookup> {
        let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO ");
        qb.push(kind.table())
            .push(" (name) VALUES (")
            .push_bind(name.to_string())
            .push(") RETURNING id, name");

        match qb.build_query_as::<LookupRow>().fetch_one(&self.pool).await {
            Ok(row) => Ok(row.into()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(CatalogError::DuplicateLookup {
                    kind: kind.label(),
                    name: name.to_string(),
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
