use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::inventory::models::ProductRef;
use crate::inventory::repository::{CatalogInventory, CustomInventory};
use crate::orders::error::OrderError;

/// Post-decrement quantity at or below which a low-stock signal is raised
pub const LOW_STOCK_THRESHOLD: i32 = 5;

/// Outcome of one stock mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockAdjustment {
    pub product_ref: ProductRef,
    pub store_id: Uuid,
    pub name: String,
    pub previous_quantity: i32,
    pub new_quantity: i32,
    /// Set for decrements that leave the product at or below `LOW_STOCK_THRESHOLD`
    pub low_stock: bool,
}

/// Applies signed quantity deltas to whichever inventory owns a product
///
/// This is a read-then-write: it does not clamp at zero and does not guard
/// against concurrent writers. Callers validate stock before decrementing.
#[derive(Clone)]
pub struct StockMutator {
    catalog: Arc<dyn CatalogInventory>,
    custom: Arc<dyn CustomInventory>,
}

impl StockMutator {
    pub fn new(catalog: Arc<dyn CatalogInventory>, custom: Arc<dyn CustomInventory>) -> Self {
        Self { catalog, custom }
    }

    /// Add `delta` to the product's quantity
    ///
    /// Returns `None` without writing when the product no longer exists.
    pub async fn adjust(
        &self,
        product_ref: ProductRef,
        delta: i32,
    ) -> Result<Option<StockAdjustment>, OrderError> {
        let (store_id, name, previous_quantity) = match product_ref {
            ProductRef::Catalog(id) => match self.catalog.find_by_id(id).await? {
                Some(p) => (p.store_id, p.name, p.quantity),
                None => return Ok(None),
            },
            ProductRef::Custom(id) => match self.custom.find_by_id(id).await? {
                Some(p) => (p.store_id, p.name, p.quantity),
                None => return Ok(None),
            },
        };

        let new_quantity = previous_quantity + delta;
        match product_ref {
            ProductRef::Catalog(id) => self.catalog.adjust_quantity(id, new_quantity).await?,
            ProductRef::Custom(id) => self.custom.adjust_quantity(id, new_quantity).await?,
        }

        tracing::debug!(
            "Stock of {} {} moved {} -> {}",
            product_ref.product_type(),
            product_ref.id(),
            previous_quantity,
            new_quantity
        );

        Ok(Some(StockAdjustment {
            product_ref,
            store_id,
            name,
            previous_quantity,
            new_quantity,
            low_stock: delta < 0 && new_quantity <= LOW_STOCK_THRESHOLD,
        }))
    }
}
