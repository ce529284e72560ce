use std::sync::Arc;
use uuid::Uuid;

use crate::inventory::models::{
    AddCatalogProductRequest, CreateCustomProductRequest, NewCustomProduct, NewStoreProduct,
    StoreProduct, StoreProductCustom,
};
use crate::inventory::repository::{CatalogInventory, CatalogReader, CustomInventory};
use crate::orders::error::OrderError;
use crate::plans::PlanLimitsService;
use crate::stores::{Store, StoreDirectory};

/// Stocking new products under the store's product quota
#[derive(Clone)]
pub struct ProductService {
    stores: Arc<dyn StoreDirectory>,
    catalog_products: Arc<dyn CatalogReader>,
    catalog: Arc<dyn CatalogInventory>,
    custom: Arc<dyn CustomInventory>,
    limits: PlanLimitsService,
}

impl ProductService {
    pub fn new(
        stores: Arc<dyn StoreDirectory>,
        catalog_products: Arc<dyn CatalogReader>,
        catalog: Arc<dyn CatalogInventory>,
        custom: Arc<dyn CustomInventory>,
        limits: PlanLimitsService,
    ) -> Self {
        Self {
            stores,
            catalog_products,
            catalog,
            custom,
            limits,
        }
    }

    async fn store_for_owner(&self, owner_id: Uuid) -> Result<Store, OrderError> {
        self.stores
            .find_by_owner(owner_id)
            .await?
            .ok_or(OrderError::StoreNotFound)
    }

    /// Stock a shared catalog product in the owner's store
    ///
    /// The selling price defaults to the catalog's suggested price. A catalog
    /// product can be added to a store only once.
    pub async fn add_catalog_product(
        &self,
        owner_id: Uuid,
        request: AddCatalogProductRequest,
    ) -> Result<StoreProduct, OrderError> {
        let store = self.store_for_owner(owner_id).await?;
        self.limits.check_can_add_product(store.id, store.plan()).await?;

        let template = self
            .catalog_products
            .find_by_id(request.catalog_id)
            .await?
            .ok_or(OrderError::CatalogProductNotFound(request.catalog_id))?;

        if self
            .catalog
            .find_by_catalog_id(store.id, template.id)
            .await?
            .is_some()
        {
            return Err(OrderError::AlreadyAdded(template.id));
        }

        let product = self
            .catalog
            .create(NewStoreProduct {
                store_id: store.id,
                catalog_id: template.id,
                price: request.price.unwrap_or(template.suggested_price),
                catalog_price: template.normal_price,
                name: template.name,
                brand: template.brand,
                company: template.company,
                category: template.category,
                img_url: template.img_url,
                quantity: request.quantity,
                cost_price: request.cost_price,
                validity_date: request.validity_date,
            })
            .await?;

        tracing::info!(
            "Catalog product {} added to store {} as {}",
            product.catalog_id,
            store.id,
            product.id
        );
        Ok(product)
    }

    pub async fn create_custom_product(
        &self,
        owner_id: Uuid,
        request: CreateCustomProductRequest,
    ) -> Result<StoreProductCustom, OrderError> {
        let store = self.store_for_owner(owner_id).await?;
        self.limits.check_can_add_product(store.id, store.plan()).await?;

        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(OrderError::ValidationFailure("Name is required".to_string()));
        }

        let product = self
            .custom
            .create(NewCustomProduct {
                store_id: store.id,
                name,
                company: request.company,
                category: request.category,
                img_url: request.img_url,
                price: request.price,
                quantity: request.quantity,
                cost_price: request.cost_price,
            })
            .await?;

        tracing::info!("Custom product {} created for store {}", product.id, store.id);
        Ok(product)
    }
}
