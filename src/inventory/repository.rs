use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::inventory::models::{
    CatalogProduct, NewCustomProduct, NewStoreProduct, StoreProduct, StoreProductCustom,
};
use crate::orders::error::OrderError;

/// Catalog-linked inventory
#[async_trait]
pub trait CatalogInventory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoreProduct>, OrderError>;
    async fn find_by_catalog_id(
        &self,
        store_id: Uuid,
        catalog_id: i64,
    ) -> Result<Option<StoreProduct>, OrderError>;
    /// Overwrite the quantity on hand
    async fn adjust_quantity(&self, id: Uuid, new_quantity: i32) -> Result<(), OrderError>;
    async fn create(&self, product: NewStoreProduct) -> Result<StoreProduct, OrderError>;
    async fn count_for_store(&self, store_id: Uuid) -> Result<i64, OrderError>;
}

/// Custom inventory
#[async_trait]
pub trait CustomInventory: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoreProductCustom>, OrderError>;
    /// Overwrite the quantity on hand
    async fn adjust_quantity(&self, id: Uuid, new_quantity: i32) -> Result<(), OrderError>;
    async fn create(&self, product: NewCustomProduct) -> Result<StoreProductCustom, OrderError>;
    async fn count_for_store(&self, store_id: Uuid) -> Result<i64, OrderError>;
}

/// Read access to the shared catalog
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<CatalogProduct>, OrderError>;
}

const STORE_PRODUCT_COLUMNS: &str = "id, store_id, catalog_id, name, brand, company, category, \
     img_url, price, catalog_price, quantity, cost_price, validity_date, status, created_at, updated_at";

const CUSTOM_PRODUCT_COLUMNS: &str = "id, store_id, name, company, category, img_url, price, \
     quantity, cost_price, status, created_at, updated_at";

/// Repository for catalog-linked store products
#[derive(Clone)]
pub struct PgCatalogInventory {
    pool: PgPool,
}

impl PgCatalogInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogInventory for PgCatalogInventory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoreProduct>, OrderError> {
        let product = sqlx::query_as::<_, StoreProduct>(&format!(
            "SELECT {} FROM store_products WHERE id = $1",
            STORE_PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn find_by_catalog_id(
        &self,
        store_id: Uuid,
        catalog_id: i64,
    ) -> Result<Option<StoreProduct>, OrderError> {
        let product = sqlx::query_as::<_, StoreProduct>(&format!(
            "SELECT {} FROM store_products WHERE store_id = $1 AND catalog_id = $2",
            STORE_PRODUCT_COLUMNS
        ))
        .bind(store_id)
        .bind(catalog_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn adjust_quantity(&self, id: Uuid, new_quantity: i32) -> Result<(), OrderError> {
        // Plain overwrite. Concurrent sales of the same product can lose an update;
        // `SET quantity = quantity - $k WHERE quantity >= $k` would close that gap.
        sqlx::query("UPDATE store_products SET quantity = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_quantity)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn create(&self, product: NewStoreProduct) -> Result<StoreProduct, OrderError> {
        let created = sqlx::query_as::<_, StoreProduct>(&format!(
            r#"
            INSERT INTO store_products
                (store_id, catalog_id, name, brand, company, category, img_url,
                 price, catalog_price, quantity, cost_price, validity_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {}
            "#,
            STORE_PRODUCT_COLUMNS
        ))
        .bind(product.store_id)
        .bind(product.catalog_id)
        .bind(&product.name)
        .bind(&product.brand)
        .bind(&product.company)
        .bind(&product.category)
        .bind(&product.img_url)
        .bind(product.price)
        .bind(product.catalog_price)
        .bind(product.quantity)
        .bind(product.cost_price)
        .bind(product.validity_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn count_for_store(&self, store_id: Uuid) -> Result<i64, OrderError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store_products WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Repository for custom store products
#[derive(Clone)]
pub struct PgCustomInventory {
    pool: PgPool,
}

impl PgCustomInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomInventory for PgCustomInventory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoreProductCustom>, OrderError> {
        let product = sqlx::query_as::<_, StoreProductCustom>(&format!(
            "SELECT {} FROM store_products_custom WHERE id = $1",
            CUSTOM_PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn adjust_quantity(&self, id: Uuid, new_quantity: i32) -> Result<(), OrderError> {
        sqlx::query(
            "UPDATE store_products_custom SET quantity = $1, updated_at = NOW() WHERE id = $2",
        )
        .bind(new_quantity)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn create(&self, product: NewCustomProduct) -> Result<StoreProductCustom, OrderError> {
        let created = sqlx::query_as::<_, StoreProductCustom>(&format!(
            r#"
            INSERT INTO store_products_custom
                (store_id, name, company, category, img_url, price, quantity, cost_price)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            CUSTOM_PRODUCT_COLUMNS
        ))
        .bind(product.store_id)
        .bind(&product.name)
        .bind(&product.company)
        .bind(&product.category)
        .bind(&product.img_url)
        .bind(product.price)
        .bind(product.quantity)
        .bind(product.cost_price)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    async fn count_for_store(&self, store_id: Uuid) -> Result<i64, OrderError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM store_products_custom WHERE store_id = $1")
                .bind(store_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// Repository for the shared catalog
#[derive(Clone)]
pub struct PgCatalogReader {
    pool: PgPool,
}

impl PgCatalogReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogReader for PgCatalogReader {
    async fn find_by_id(&self, id: i64) -> Result<Option<CatalogProduct>, OrderError> {
        let product = sqlx::query_as::<_, CatalogProduct>(
            r#"
            SELECT id, name, brand, company, category, normal_price, suggested_price, barcode, img_url
            FROM catalog_products
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }
}
