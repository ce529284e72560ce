// Product resolution across the two inventories
//
// An order line carries a bare product id. The catalog-linked inventory is
// consulted first and the custom inventory is the fallback; the resulting
// `ProductRef` is what every later step (stock mutation, restitution) uses.

use std::sync::Arc;
use uuid::Uuid;

use crate::inventory::models::{ProductRef, StoreProduct, StoreProductCustom};
use crate::inventory::repository::{CatalogInventory, CustomInventory};
use crate::orders::error::OrderError;

/// Unified view of a product from either inventory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProduct {
    pub product_ref: ProductRef,
    pub store_id: Uuid,
    pub name: String,
    /// Unit price in minor units
    pub price: i64,
    pub quantity: i32,
    pub img_url: Option<String>,
    pub company: Option<String>,
}

impl From<StoreProduct> for ResolvedProduct {
    fn from(product: StoreProduct) -> Self {
        Self {
            product_ref: ProductRef::Catalog(product.id),
            store_id: product.store_id,
            name: product.name,
            price: product.price,
            quantity: product.quantity,
            img_url: product.img_url,
            company: Some(product.company),
        }
    }
}

impl From<StoreProductCustom> for ResolvedProduct {
    fn from(product: StoreProductCustom) -> Self {
        Self {
            product_ref: ProductRef::Custom(product.id),
            store_id: product.store_id,
            name: product.name,
            price: product.price,
            quantity: product.quantity,
            img_url: product.img_url,
            company: product.company,
        }
    }
}

#[derive(Clone)]
pub struct ProductResolver {
    catalog: Arc<dyn CatalogInventory>,
    custom: Arc<dyn CustomInventory>,
}

impl ProductResolver {
    pub fn new(catalog: Arc<dyn CatalogInventory>, custom: Arc<dyn CustomInventory>) -> Self {
        Self { catalog, custom }
    }

    /// Resolve a bare product id for `store_id`
    ///
    /// Fails with `ProductNotFound` when neither inventory holds the id and with
    /// `OwnershipMismatch` when the hit belongs to another store.
    pub async fn resolve(&self, store_id: Uuid, id: Uuid) -> Result<ResolvedProduct, OrderError> {
        let resolved = match self.catalog.find_by_id(id).await? {
            Some(product) => ResolvedProduct::from(product),
            None => match self.custom.find_by_id(id).await? {
                Some(product) => ResolvedProduct::from(product),
                None => {
                    tracing::debug!("Product {} not found in either inventory", id);
                    return Err(OrderError::ProductNotFound(id));
                }
            },
        };

        if resolved.store_id != store_id {
            tracing::warn!(
                "Product {} belongs to store {}, not {}",
                id,
                resolved.store_id,
                store_id
            );
            return Err(OrderError::OwnershipMismatch { resource: "Product" });
        }

        Ok(resolved)
    }

    /// Look a product up in the inventory its reference already names
    pub async fn find(&self, product_ref: ProductRef) -> Result<Option<ResolvedProduct>, OrderError> {
        let found = match product_ref {
            ProductRef::Catalog(id) => self.catalog.find_by_id(id).await?.map(ResolvedProduct::from),
            ProductRef::Custom(id) => self.custom.find_by_id(id).await?.map(ResolvedProduct::from),
        };
        Ok(found)
    }
}
