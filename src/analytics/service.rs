// Read-only sales reporting over persisted orders

use chrono::{Datelike, Duration, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use uuid::Uuid;

use crate::analytics::models::{
    to_major_units, BrandRevenue, Dashboard, MonthSummary, PaginatedDashboard, Pagination, Period,
    PreviousPeriod, SalesMetrics, SalesTotals, MONTH_LABELS,
};
use crate::clock::{month_bounds, month_bounds_for, Clock, DateRange};
use crate::inventory::repository::{CatalogInventory, CustomInventory};
use crate::inventory::resolver::ProductResolver;
use crate::orders::error::OrderError;
use crate::orders::models::is_approved;
use crate::orders::query::OrderFilters;
use crate::orders::repository::OrderStore;
use crate::stores::{Store, StoreDirectory};

/// Brand key for items whose product no longer exists
pub const UNKNOWN_BRAND: &str = "unknown";

#[derive(Clone)]
pub struct AnalyticsService {
    stores: Arc<dyn StoreDirectory>,
    orders: Arc<dyn OrderStore>,
    resolver: ProductResolver,
    clock: Arc<dyn Clock>,
}

impl AnalyticsService {
    pub fn new(
        stores: Arc<dyn StoreDirectory>,
        orders: Arc<dyn OrderStore>,
        catalog: Arc<dyn CatalogInventory>,
        custom: Arc<dyn CustomInventory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            stores,
            orders,
            resolver: ProductResolver::new(catalog, custom),
            clock,
        }
    }

    async fn store_for_owner(&self, owner_id: Uuid) -> Result<Store, OrderError> {
        self.stores
            .find_by_owner(owner_id)
            .await?
            .ok_or(OrderError::StoreNotFound)
    }

    async fn totals_between(
        &self,
        store_id: Uuid,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<SalesTotals, OrderError> {
        let range = DateRange::from_days(from, to);
        let orders = self.orders.list_all(store_id, Some(&range)).await?;
        Ok(SalesTotals::from_orders(&orders))
    }

    /// Totals and orders for the owner's store, optionally within a day range
    pub async fn dashboard(
        &self,
        owner_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<Dashboard, OrderError> {
        tracing::debug!("Dashboard for owner {} ({:?}..{:?})", owner_id, from, to);
        let store = self.store_for_owner(owner_id).await?;

        let range = DateRange::from_optional_days(from, to);
        let orders = self.orders.list_all(store.id, range.as_ref()).await?;

        Ok(Dashboard {
            totals: SalesTotals::from_orders(&orders),
            orders,
        })
    }

    /// One page of orders with totals over that page
    pub async fn dashboard_paginated(
        &self,
        owner_id: Uuid,
        filters: &OrderFilters,
    ) -> Result<PaginatedDashboard, OrderError> {
        tracing::debug!("Paginated dashboard for owner {}: {:?}", owner_id, filters);
        let store = self.store_for_owner(owner_id).await?;

        let page = self.orders.list_paginated(store.id, filters).await?;

        Ok(PaginatedDashboard {
            totals: SalesTotals::from_orders(&page.orders),
            orders: page.orders,
            pagination: Pagination::new(filters.page, filters.limit, page.total),
        })
    }

    /// Current period against the equally long period right before it
    ///
    /// Without both bounds the current calendar month is used. The previous
    /// period ends the day before `from` and starts `to - from` days earlier.
    pub async fn metrics(
        &self,
        owner_id: Uuid,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<SalesMetrics, OrderError> {
        let store = self.store_for_owner(owner_id).await?;

        let (current_from, current_to) = match (from, to) {
            (Some(f), Some(t)) => (f, t),
            _ => month_bounds(self.clock.now()),
        };
        let span_days = (current_to - current_from).num_days();
        let (previous_from, previous_to) = current_from
            .checked_sub_signed(Duration::days(1))
            .and_then(|to| to.checked_sub_signed(Duration::days(span_days)).map(|from| (from, to)))
            .ok_or_else(|| {
                OrderError::ValidationFailure(format!(
                    "No previous period before {}",
                    current_from
                ))
            })?;

        let current = self.totals_between(store.id, current_from, current_to).await?;
        let previous = self.totals_between(store.id, previous_from, previous_to).await?;

        tracing::debug!(
            "Metrics for store {}: {}..{} vs {}..{}",
            store.id,
            current_from,
            current_to,
            previous_from,
            previous_to
        );

        Ok(SalesMetrics {
            totals: current,
            percentage_change: current.delta(&previous),
            current_period: Period {
                from: current_from,
                to: current_to,
            },
            previous_period: PreviousPeriod {
                from: previous_from,
                to: previous_to,
                totals: previous,
            },
        })
    }

    pub async fn monthly_summary_for_owner(
        &self,
        owner_id: Uuid,
        year: Option<i32>,
    ) -> Result<Vec<MonthSummary>, OrderError> {
        let store = self.store_for_owner(owner_id).await?;
        let year = year.unwrap_or_else(|| self.clock.now().year());
        self.monthly_summary(store.id, year).await
    }

    /// Approved revenue per month of `year`, each month split by brand
    pub async fn monthly_summary(
        &self,
        store_id: Uuid,
        year: i32,
    ) -> Result<Vec<MonthSummary>, OrderError> {
        let mut brand_cache: HashMap<_, String> = HashMap::new();
        let mut months = Vec::with_capacity(MONTH_LABELS.len());

        for (index, (label, full_label)) in MONTH_LABELS.iter().enumerate() {
            let (first, last) = month_bounds_for(year, index as u32 + 1).ok_or_else(|| {
                OrderError::ValidationFailure(format!("Invalid year: {}", year))
            })?;
            let range = DateRange::from_days(first, last);

            let approved: Vec<_> = self
                .orders
                .list_all(store_id, Some(&range))
                .await?
                .into_iter()
                .filter(|o| is_approved(&o.status))
                .collect();

            let month_total: i64 = approved.iter().map(|o| o.total).sum();
            let order_ids: Vec<Uuid> = approved.iter().map(|o| o.id).collect();

            let mut by_brand: BTreeMap<String, i64> = BTreeMap::new();
            if !order_ids.is_empty() {
                for item in self.orders.items_for_orders(&order_ids).await? {
                    let brand = match item.product_ref() {
                        Some(product_ref) => match brand_cache.get(&product_ref) {
                            Some(brand) => brand.clone(),
                            None => {
                                let brand = self
                                    .resolver
                                    .find(product_ref)
                                    .await?
                                    .and_then(|p| p.company)
                                    .filter(|c| !c.is_empty())
                                    .unwrap_or_else(|| UNKNOWN_BRAND.to_string());
                                brand_cache.insert(product_ref, brand.clone());
                                brand
                            }
                        },
                        None => UNKNOWN_BRAND.to_string(),
                    };
                    *by_brand.entry(brand).or_default() += item.line_total();
                }
            }

            months.push(MonthSummary {
                label: label.to_string(),
                full_label: full_label.to_string(),
                value: to_major_units(month_total),
                brands: by_brand
                    .into_iter()
                    .map(|(name, value)| BrandRevenue {
                        name,
                        value: to_major_units(value),
                    })
                    .collect(),
            });
        }

        Ok(months)
    }
}
