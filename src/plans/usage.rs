// Plan usage and quota enforcement against persisted counts

use serde::{Serialize, Serializer};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::clock::{current_month, Clock};
use crate::inventory::repository::{CatalogInventory, CustomInventory};
use crate::orders::error::{OrderError, QuotaResource};
use crate::orders::repository::OrderStore;
use crate::plans::policy::{can_add_product, can_create_order, limits_for, Plan, PlanLimits, UNLIMITED};

/// Counts a store has used in the current window, recomputed on demand
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanUsageSnapshot {
    pub monthly_orders: i64,
    /// Catalog-linked plus custom products
    pub total_products: i64,
}

/// Headroom left under a limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Remaining {
    Unlimited,
    Count(i64),
}

impl Remaining {
    fn of(limit: i64, used: i64) -> Self {
        if limit == UNLIMITED {
            Remaining::Unlimited
        } else {
            Remaining::Count((limit - used).max(0))
        }
    }
}

impl Serialize for Remaining {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Remaining::Unlimited => serializer.serialize_str("unlimited"),
            Remaining::Count(n) => serializer.serialize_i64(*n),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingUsage {
    pub monthly_orders: Remaining,
    pub products: Remaining,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsagePercentage {
    pub orders_percentage: f64,
    pub products_percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageInfo {
    pub plan: Plan,
    pub limits: PlanLimits,
    pub usage: PlanUsageSnapshot,
    pub remaining: RemainingUsage,
    pub percentage: UsagePercentage,
}

fn percentage(used: i64, limit: i64) -> f64 {
    if limit == UNLIMITED || limit <= 0 {
        return 0.0;
    }
    (used as f64 / limit as f64 * 100.0).min(100.0)
}

/// Checks plan quotas against the order store and both inventories
#[derive(Clone)]
pub struct PlanLimitsService {
    orders: Arc<dyn OrderStore>,
    catalog: Arc<dyn CatalogInventory>,
    custom: Arc<dyn CustomInventory>,
    clock: Arc<dyn Clock>,
}

impl PlanLimitsService {
    pub fn new(
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogInventory>,
        custom: Arc<dyn CustomInventory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            orders,
            catalog,
            custom,
            clock,
        }
    }

    pub async fn monthly_orders(&self, store_id: Uuid) -> Result<i64, OrderError> {
        let month = current_month(self.clock.as_ref());
        self.orders.count_in_range(store_id, &month).await
    }

    pub async fn total_products(&self, store_id: Uuid) -> Result<i64, OrderError> {
        let catalog = self.catalog.count_for_store(store_id).await?;
        let custom = self.custom.count_for_store(store_id).await?;
        Ok(catalog + custom)
    }

    pub async fn snapshot(&self, store_id: Uuid) -> Result<PlanUsageSnapshot, OrderError> {
        Ok(PlanUsageSnapshot {
            monthly_orders: self.monthly_orders(store_id).await?,
            total_products: self.total_products(store_id).await?,
        })
    }

    /// Fail with `QuotaExceeded` when the store used up its monthly orders
    pub async fn check_can_create_order(&self, store_id: Uuid, plan: Plan) -> Result<(), OrderError> {
        let current = self.monthly_orders(store_id).await?;
        if !can_create_order(plan, current) {
            let limit = limits_for(plan).monthly_orders;
            tracing::warn!(
                "Store {} reached {} monthly orders on plan {}",
                store_id,
                current,
                plan
            );
            return Err(OrderError::QuotaExceeded {
                plan,
                limit,
                resource: QuotaResource::MonthlyOrders,
            });
        }
        Ok(())
    }

    /// Fail with `QuotaExceeded` when the store used up its product slots
    pub async fn check_can_add_product(&self, store_id: Uuid, plan: Plan) -> Result<(), OrderError> {
        let current = self.total_products(store_id).await?;
        if !can_add_product(plan, current) {
            let limit = limits_for(plan).max_products;
            tracing::warn!(
                "Store {} reached {} products on plan {}",
                store_id,
                current,
                plan
            );
            return Err(OrderError::QuotaExceeded {
                plan,
                limit,
                resource: QuotaResource::Products,
            });
        }
        Ok(())
    }

    pub async fn usage_info(&self, store_id: Uuid, plan: Plan) -> Result<UsageInfo, OrderError> {
        let usage = self.snapshot(store_id).await?;
        let limits = limits_for(plan);

        Ok(UsageInfo {
            plan,
            limits,
            usage,
            remaining: RemainingUsage {
                monthly_orders: Remaining::of(limits.monthly_orders, usage.monthly_orders),
                products: Remaining::of(limits.max_products, usage.total_products),
            },
            percentage: UsagePercentage {
                orders_percentage: percentage(usage.monthly_orders, limits.monthly_orders),
                products_percentage: percentage(usage.total_products, limits.max_products),
            },
        })
    }
}
