use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::orders::models::{is_approved, Order};

/// Share of revenue reported as estimated profit, in percent
pub const PROFIT_PERCENT: i64 = 30;

/// Fixed-margin profit estimate, rounded half up
pub fn estimated_profit(revenue: i64) -> i64 {
    (revenue * PROFIT_PERCENT + 50).div_euclid(100)
}

/// Count, approved revenue and profit estimate over a set of orders
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesTotals {
    pub total_orders: i64,
    /// Minor units, approved orders only
    pub total_revenue: i64,
    pub estimated_profit: i64,
}

impl SalesTotals {
    pub fn from_orders(orders: &[Order]) -> Self {
        let total_revenue = orders
            .iter()
            .filter(|o| is_approved(&o.status))
            .map(|o| o.total)
            .sum();

        Self {
            total_orders: orders.len() as i64,
            total_revenue,
            estimated_profit: estimated_profit(total_revenue),
        }
    }

    /// Absolute differences `self - previous`
    pub fn delta(&self, previous: &SalesTotals) -> PeriodDelta {
        PeriodDelta {
            orders: self.total_orders - previous.total_orders,
            revenue: self.total_revenue - previous.total_revenue,
            profit: self.estimated_profit - previous.estimated_profit,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    #[serde(flatten)]
    pub totals: SalesTotals,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32, total: i64) -> Self {
        let size = i64::from(page_size.max(1));
        Self {
            page,
            page_size,
            total,
            total_pages: (total + size - 1) / size,
        }
    }
}

/// A page of orders; the totals cover only the orders on this page
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedDashboard {
    #[serde(flatten)]
    pub totals: SalesTotals,
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

/// Absolute period-over-period differences
///
/// Serialized as `percentageChange` for client compatibility, but the values
/// are plain differences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct PeriodDelta {
    pub orders: i64,
    pub revenue: i64,
    pub profit: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Period {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PreviousPeriod {
    pub from: NaiveDate,
    pub to: NaiveDate,
    #[serde(flatten)]
    pub totals: SalesTotals,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SalesMetrics {
    #[serde(flatten)]
    pub totals: SalesTotals,
    pub percentage_change: PeriodDelta,
    pub current_period: Period,
    pub previous_period: PreviousPeriod,
}

/// Revenue of one brand in a month, major units
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BrandRevenue {
    pub name: String,
    pub value: f64,
}

/// Approved revenue of one calendar month, major units
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonthSummary {
    pub label: String,
    pub full_label: String,
    pub value: f64,
    pub brands: Vec<BrandRevenue>,
}

pub const MONTH_LABELS: [(&str, &str); 12] = [
    ("Jan", "January"),
    ("Feb", "February"),
    ("Mar", "March"),
    ("Apr", "April"),
    ("May", "May"),
    ("Jun", "June"),
    ("Jul", "July"),
    ("Aug", "August"),
    ("Sep", "September"),
    ("Oct", "October"),
    ("Nov", "November"),
    ("Dec", "December"),
];

/// Minor units to major units
pub fn to_major_units(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// `from`/`to` as calendar days
#[derive(Debug, Default, Deserialize)]
pub struct DashboardQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MonthlyQuery {
    pub year: Option<i32>,
}
