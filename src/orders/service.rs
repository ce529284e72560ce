use std::sync::Arc;
use uuid::Uuid;

use crate::clock::Clock;
use crate::inventory::repository::{CatalogInventory, CustomInventory};
use crate::inventory::resolver::ProductResolver;
use crate::inventory::stock::{StockAdjustment, StockMutator};
use crate::notifications::NotificationFanout;
use crate::orders::error::OrderError;
use crate::orders::models::{
    CreateOrderRequest, NewOrder, Order, OrderDetails, STATUS_APPROVED, STATUS_PENDING,
};
use crate::orders::number::OrderNumberGenerator;
use crate::orders::price_calculator::PriceCalculator;
use crate::orders::repository::OrderStore;
use crate::plans::{Plan, PlanLimitsService};
use crate::stores::{Store, StoreDirectory};
use crate::validation::validate_delivery_fields;

/// Number of orders returned by the recent sales widget
pub const RECENT_SALES_LIMIT: i64 = 3;

/// Service for the order lifecycle: placement, status changes and deletion
#[derive(Clone)]
pub struct OrderService {
    stores: Arc<dyn StoreDirectory>,
    orders: Arc<dyn OrderStore>,
    resolver: ProductResolver,
    stock: StockMutator,
    limits: PlanLimitsService,
    numbers: Arc<dyn OrderNumberGenerator>,
    fanout: NotificationFanout,
}

impl OrderService {
    pub fn new(
        stores: Arc<dyn StoreDirectory>,
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogInventory>,
        custom: Arc<dyn CustomInventory>,
        numbers: Arc<dyn OrderNumberGenerator>,
        clock: Arc<dyn Clock>,
        fanout: NotificationFanout,
    ) -> Self {
        Self {
            stores,
            resolver: ProductResolver::new(catalog.clone(), custom.clone()),
            stock: StockMutator::new(catalog.clone(), custom.clone()),
            limits: PlanLimitsService::new(orders.clone(), catalog, custom, clock),
            orders,
            numbers,
            fanout,
        }
    }

    async fn store_for_owner(&self, owner_id: Uuid) -> Result<Store, OrderError> {
        self.stores
            .find_by_owner(owner_id)
            .await?
            .ok_or(OrderError::StoreNotFound)
    }

    /// Load an order and make sure it belongs to `store`
    async fn owned_order(&self, store: &Store, order_id: Uuid) -> Result<Order, OrderError> {
        let order = self
            .orders
            .find_by_id(order_id)
            .await?
            .ok_or(OrderError::OrderNotFound)?;

        if order.store_id != store.id {
            tracing::warn!(
                "Store {} tried to access order {} of store {}",
                store.id,
                order_id,
                order.store_id
            );
            return Err(OrderError::OwnershipMismatch { resource: "Order" });
        }
        Ok(order)
    }

    /// Create a sale entered by the store owner
    ///
    /// When `plan` is given the monthly order quota is enforced first. The
    /// initial status defaults to `Approved`.
    pub async fn create_order(
        &self,
        request: CreateOrderRequest,
        owner_id: Uuid,
        status: Option<String>,
        plan: Option<Plan>,
    ) -> Result<OrderDetails, OrderError> {
        tracing::debug!("Creating staff order for owner {}", owner_id);
        let store = self.store_for_owner(owner_id).await?;

        if let Some(plan) = plan {
            self.limits.check_can_create_order(store.id, plan).await?;
        }

        let status = match status.map(|s| s.trim().to_string()) {
            Some(s) if !s.is_empty() => s,
            _ => STATUS_APPROVED.to_string(),
        };

        let (details, adjustments) = self.place(&store, request, status).await?;
        self.fanout.low_stock(&adjustments).await;

        Ok(details)
    }

    /// Create an order from the public storefront at `subdomain`
    ///
    /// Always starts `pending`. The owner's plan quota is not consulted here.
    pub async fn create_online_order(
        &self,
        request: CreateOrderRequest,
        subdomain: &str,
    ) -> Result<OrderDetails, OrderError> {
        tracing::debug!("Creating online order for store '{}'", subdomain);
        let store = self
            .stores
            .find_by_subdomain(subdomain)
            .await?
            .ok_or(OrderError::StoreNotFound)?;

        let (details, adjustments) = self
            .place(&store, request, STATUS_PENDING.to_string())
            .await?;

        self.fanout.order_created_online(&store, &details).await;
        self.fanout.low_stock(&adjustments).await;

        Ok(details)
    }

    /// Validate, price, persist and decrement stock
    ///
    /// Every check runs before the first write. The order and its items are
    /// inserted together; stock is decremented line by line afterwards.
    async fn place(
        &self,
        store: &Store,
        request: CreateOrderRequest,
        status: String,
    ) -> Result<(OrderDetails, Vec<StockAdjustment>), OrderError> {
        validate_delivery_fields(
            request.is_delivery,
            request.delivery_street.as_deref(),
            request.delivery_number.as_deref(),
            request.delivery_neighborhood.as_deref(),
        )?;

        let prepared = PriceCalculator::prepare(&self.resolver, store.id, &request.items).await?;

        let total = match request.total {
            Some(total) if total < 0 => {
                return Err(OrderError::ValidationFailure(
                    "Total cannot be negative".to_string(),
                ))
            }
            // zero counts as not supplied
            Some(0) | None => prepared.total,
            Some(total) => total,
        };

        let new_order = NewOrder {
            order_number: self.numbers.next(),
            store_id: store.id,
            status,
            customer_name: request.customer_name,
            customer_phone: request.customer_phone,
            payment_method: request.payment_method,
            total,
            is_delivery: request.is_delivery,
            delivery_street: request.delivery_street,
            delivery_number: request.delivery_number,
            delivery_neighborhood: request.delivery_neighborhood,
            created_at: request.created_at,
        };

        let details = self.orders.insert(new_order, prepared.items.clone()).await?;

        let mut adjustments = Vec::with_capacity(prepared.items.len());
        for item in &prepared.items {
            if let Some(adjustment) = self.stock.adjust(item.product_ref, -item.quantity).await? {
                adjustments.push(adjustment);
            }
        }

        tracing::info!(
            "Order {} created for store {} with {} items, total {}",
            details.order.order_number,
            store.id,
            details.items.len(),
            details.order.total
        );

        Ok((details, adjustments))
    }

    /// Overwrite an order's status; any status may follow any other
    pub async fn update_order_status(
        &self,
        order_id: Uuid,
        owner_id: Uuid,
        status: &str,
    ) -> Result<Order, OrderError> {
        let store = self.store_for_owner(owner_id).await?;
        self.owned_order(&store, order_id).await?;

        let updated = self.orders.update_status(order_id, status).await?;
        tracing::info!("Order {} moved to status '{}'", order_id, status);

        self.fanout.order_updated(store.id, &updated).await;
        Ok(updated)
    }

    /// Return each line's quantity to stock, then delete the order
    ///
    /// Lines whose product no longer exists are skipped.
    pub async fn delete_order(&self, order_id: Uuid, owner_id: Uuid) -> Result<(), OrderError> {
        let store = self.store_for_owner(owner_id).await?;
        self.owned_order(&store, order_id).await?;

        let items = self.orders.find_items(order_id).await?;
        for item in &items {
            let Some(product_ref) = item.product_ref() else {
                tracing::warn!(
                    "Order {} item {} has no {} product id, restitution skipped",
                    order_id,
                    item.id,
                    item.product_type
                );
                continue;
            };

            if self.stock.adjust(product_ref, item.quantity).await?.is_none() {
                tracing::warn!(
                    "Product {} of order {} no longer exists, {} units not restored",
                    product_ref.id(),
                    order_id,
                    item.quantity
                );
            }
        }

        self.orders.delete(order_id).await?;
        tracing::info!("Order {} deleted, {} lines restituted", order_id, items.len());
        Ok(())
    }

    /// The store's newest orders
    pub async fn recent_sales(&self, owner_id: Uuid) -> Result<Vec<Order>, OrderError> {
        let store = self.store_for_owner(owner_id).await?;
        self.orders.recent(store.id, RECENT_SALES_LIMIT).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orders::models::OrderLineRequest;
    use crate::testing::{catalog_product, custom_product, seed_orders, store, Harness};
    use chrono::{TimeZone, Utc};

    fn request(lines: Vec<(Uuid, i32)>) -> CreateOrderRequest {
        CreateOrderRequest {
            payment_method: "pix".to_string(),
            customer_name: Some("Ana".to_string()),
            items: lines
                .into_iter()
                .map(|(id, quantity)| OrderLineRequest {
                    store_product_id: id,
                    quantity,
                })
                .collect(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_order_decrements_stock_and_defaults_to_approved() {
        let h = Harness::new(store("Free"));
        let product = catalog_product(h.store.id, "Lily", 15_990, 10);
        h.inventory.insert_catalog(product.clone());

        let details = h
            .service
            .create_order(request(vec![(product.id, 3)]), h.store.user_id, None, None)
            .await
            .unwrap();

        assert_eq!(details.order.status, STATUS_APPROVED);
        assert_eq!(details.order.total, 3 * 15_990);
        assert_eq!(details.order.order_number, "ORD-TEST-1");
        assert_eq!(h.inventory.catalog_quantity(product.id), Some(7));
        assert_eq!(h.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_create_order_uses_caller_status_and_total() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 500, 10);
        h.inventory.insert_custom(product.clone());
        let mut dto = request(vec![(product.id, 2)]);
        dto.total = Some(900);

        let details = h
            .service
            .create_order(dto, h.store.user_id, Some("delivered".to_string()), None)
            .await
            .unwrap();

        assert_eq!(details.order.status, "delivered");
        assert_eq!(details.order.total, 900);
    }

    #[tokio::test]
    async fn test_zero_caller_total_falls_back_to_computed() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 500, 10);
        h.inventory.insert_custom(product.clone());
        let mut dto = request(vec![(product.id, 2)]);
        dto.total = Some(0);

        let details = h
            .service
            .create_order(dto, h.store.user_id, None, None)
            .await
            .unwrap();

        assert_eq!(details.order.total, 1_000);
    }

    #[tokio::test]
    async fn test_unknown_owner_is_store_not_found() {
        let h = Harness::new(store("Free"));
        let err = h
            .service
            .create_order(request(vec![(Uuid::new_v4(), 1)]), Uuid::new_v4(), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::StoreNotFound));
    }

    #[tokio::test]
    async fn test_quota_rejects_at_limit_and_allows_below() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 500, 100);
        h.inventory.insert_custom(product.clone());
        let this_month = Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap();
        seed_orders(&h.orders, h.store.id, this_month, 9);

        h.service
            .create_order(request(vec![(product.id, 1)]), h.store.user_id, None, Some(Plan::Free))
            .await
            .unwrap();

        let err = h
            .service
            .create_order(request(vec![(product.id, 1)]), h.store.user_id, None, Some(Plan::Free))
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::QuotaExceeded { plan: Plan::Free, limit: 10, .. }));
        assert_eq!(h.inventory.custom_quantity(product.id), Some(99));
    }

    #[tokio::test]
    async fn test_quota_skipped_without_plan() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 500, 100);
        h.inventory.insert_custom(product.clone());
        seed_orders(&h.orders, h.store.id, Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap(), 10);

        let result = h
            .service
            .create_order(request(vec![(product.id, 1)]), h.store.user_id, None, None)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let h = Harness::new(store("Free"));
        let plenty = catalog_product(h.store.id, "Lily", 1_000, 50);
        let scarce = custom_product(h.store.id, "Soap", 500, 4);
        h.inventory.insert_catalog(plenty.clone());
        h.inventory.insert_custom(scarce.clone());

        let err = h
            .service
            .create_order(
                request(vec![(plenty.id, 2), (scarce.id, 5)]),
                h.store.user_id,
                None,
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::InsufficientStock { available: 4, requested: 5, .. }));
        assert_eq!(h.inventory.catalog_quantity(plenty.id), Some(50));
        assert_eq!(h.inventory.custom_quantity(scarce.id), Some(4));
        assert_eq!(h.orders.len(), 0);
    }

    #[tokio::test]
    async fn test_delivery_requires_address() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 500, 4);
        h.inventory.insert_custom(product.clone());
        let mut dto = request(vec![(product.id, 1)]);
        dto.is_delivery = true;
        dto.delivery_street = Some("Rua A".to_string());

        let err = h
            .service
            .create_order(dto, h.store.user_id, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::ValidationFailure(_)));
        assert_eq!(h.orders.len(), 0);
    }

    #[tokio::test]
    async fn test_online_order_is_pending_and_notifies_owner() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 2_500, 10);
        h.inventory.insert_custom(product.clone());

        let details = h
            .service
            .create_online_order(request(vec![(product.id, 2)]), &h.store.subdomain)
            .await
            .unwrap();

        assert_eq!(details.order.status, STATUS_PENDING);
        assert_eq!(h.inventory.custom_quantity(product.id), Some(8));
        let events = h.realtime.events();
        assert_eq!(events[0].0, format!("user:{}", h.store.user_id));
        assert_eq!(events[0].1, "order:created");
        assert_eq!(h.push.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_online_order_ignores_quota() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 2_500, 10);
        h.inventory.insert_custom(product.clone());
        seed_orders(&h.orders, h.store.id, Utc.with_ymd_and_hms(2025, 5, 10, 9, 0, 0).unwrap(), 10);

        let result = h
            .service
            .create_online_order(request(vec![(product.id, 1)]), &h.store.subdomain)
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unknown_subdomain_is_store_not_found() {
        let h = Harness::new(store("Free"));
        let err = h
            .service
            .create_online_order(request(vec![(Uuid::new_v4(), 1)]), "nope")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::StoreNotFound));
    }

    #[tokio::test]
    async fn test_low_stock_crossing_emits_event() {
        let h = Harness::new(store("Free"));
        let product = catalog_product(h.store.id, "Lily", 1_000, 6);
        h.inventory.insert_catalog(product.clone());

        h.service
            .create_order(request(vec![(product.id, 2)]), h.store.user_id, None, None)
            .await
            .unwrap();

        let events = h.realtime.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, format!("store:{}", h.store.id));
        assert_eq!(events[0].1, "product:low-stock");
        assert_eq!(events[0].2["new_quantity"], 4);
    }

    #[tokio::test]
    async fn test_notification_failure_does_not_fail_order() {
        let h = Harness::with_failing_realtime(store("Free"));
        let product = custom_product(h.store.id, "Soap", 2_500, 10);
        h.inventory.insert_custom(product.clone());

        let result = h
            .service
            .create_online_order(request(vec![(product.id, 1)]), &h.store.subdomain)
            .await;

        assert!(result.is_ok());
        assert_eq!(h.orders.len(), 1);
    }

    #[tokio::test]
    async fn test_update_status_overwrites_freely() {
        let h = Harness::new(store("Free"));
        let product = custom_product(h.store.id, "Soap", 500, 10);
        h.inventory.insert_custom(product.clone());
        let details = h
            .service
            .create_order(request(vec![(product.id, 1)]), h.store.user_id, None, None)
            .await
            .unwrap();

        let updated = h
            .service
            .update_order_status(details.order.id, h.store.user_id, "anything-goes")
            .await
            .unwrap();
        assert_eq!(updated.status, "anything-goes");

        let back = h
            .service
            .update_order_status(details.order.id, h.store.user_id, "pending")
            .await
            .unwrap();
        assert_eq!(back.status, "pending");

        let verbatim = h
            .service
            .update_order_status(details.order.id, h.store.user_id, " Shipped ")
            .await
            .unwrap();
        assert_eq!(verbatim.status, " Shipped ");
        assert!(h
            .realtime
            .events()
            .iter()
            .any(|(room, event, _)| event == "order:updated" && *room == format!("store:{}", h.store.id)));
    }

    #[tokio::test]
    async fn test_update_status_of_foreign_order_is_ownership_mismatch() {
        let h = Harness::new(store("Free"));
        let other = store("Free");
        h.stores.insert(other.clone());
        let product = custom_product(other.id, "Soap", 500, 10);
        h.inventory.insert_custom(product.clone());
        let foreign = h
            .service
            .create_order(request(vec![(product.id, 1)]), other.user_id, None, None)
            .await
            .unwrap();

        for status in ["pending", "Approved", "cancelled"] {
            let err = h
                .service
                .update_order_status(foreign.order.id, h.store.user_id, status)
                .await
                .unwrap_err();
            assert!(matches!(err, OrderError::OwnershipMismatch { .. }));
        }
    }

    #[tokio::test]
    async fn test_update_status_of_missing_order() {
        let h = Harness::new(store("Free"));
        let err = h
            .service
            .update_order_status(Uuid::new_v4(), h.store.user_id, "pending")
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::OrderNotFound));
    }

    #[tokio::test]
    async fn test_delete_restores_stock() {
        let h = Harness::new(store("Free"));
        let catalog = catalog_product(h.store.id, "Lily", 1_000, 20);
        let custom = custom_product(h.store.id, "Soap", 500, 8);
        h.inventory.insert_catalog(catalog.clone());
        h.inventory.insert_custom(custom.clone());

        let details = h
            .service
            .create_order(
                request(vec![(catalog.id, 5), (custom.id, 3)]),
                h.store.user_id,
                None,
                None,
            )
            .await
            .unwrap();
        assert_eq!(h.inventory.catalog_quantity(catalog.id), Some(15));
        assert_eq!(h.inventory.custom_quantity(custom.id), Some(5));

        h.service
            .delete_order(details.order.id, h.store.user_id)
            .await
            .unwrap();

        assert_eq!(h.inventory.catalog_quantity(catalog.id), Some(20));
        assert_eq!(h.inventory.custom_quantity(custom.id), Some(8));
        assert_eq!(h.orders.len(), 0);
    }

    #[tokio::test]
    async fn test_delete_skips_vanished_products() {
        let h = Harness::new(store("Free"));
        let gone = custom_product(h.store.id, "Soap", 500, 8);
        let kept = custom_product(h.store.id, "Shampoo", 900, 8);
        h.inventory.insert_custom(gone.clone());
        h.inventory.insert_custom(kept.clone());

        let details = h
            .service
            .create_order(request(vec![(gone.id, 1), (kept.id, 2)]), h.store.user_id, None, None)
            .await
            .unwrap();
        h.inventory.remove_custom(gone.id);

        h.service
            .delete_order(details.order.id, h.store.user_id)
            .await
            .unwrap();

        assert_eq!(h.inventory.custom_quantity(kept.id), Some(8));
        assert_eq!(h.orders.len(), 0);
    }

    #[tokio::test]
    async fn test_delete_foreign_order_keeps_it() {
        let h = Harness::new(store("Free"));
        let other = store("Free");
        h.stores.insert(other.clone());
        let product = custom_product(other.id, "Soap", 500, 10);
        h.inventory.insert_custom(product.clone());
        let foreign = h
            .service
            .create_order(request(vec![(product.id, 1)]), other.user_id, None, None)
            .await
            .unwrap();

        let err = h
            .service
            .delete_order(foreign.order.id, h.store.user_id)
            .await
            .unwrap_err();

        assert!(matches!(err, OrderError::OwnershipMismatch { .. }));
        assert_eq!(h.orders.len(), 1);
        assert_eq!(h.inventory.custom_quantity(product.id), Some(9));
    }

    #[tokio::test]
    async fn test_recent_sales_returns_three_newest() {
        let h = Harness::new(store("Free"));
        for day in 1..=5 {
            seed_orders(&h.orders, h.store.id, Utc.with_ymd_and_hms(2025, 5, day, 9, 0, 0).unwrap(), 1);
        }

        let recent = h.service.recent_sales(h.store.user_id).await.unwrap();

        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].created_at, Utc.with_ymd_and_hms(2025, 5, 5, 9, 0, 0).unwrap());
        assert_eq!(recent[2].created_at, Utc.with_ymd_and_hms(2025, 5, 3, 9, 0, 0).unwrap());
    }
}
