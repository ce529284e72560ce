// Subscription plan limits
//
// Pure lookups from a plan tag to its quotas and feature flags. Nothing in
// here touches storage or the clock; callers supply the current counts.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Sentinel limit meaning "no ceiling"
pub const UNLIMITED: i64 = -1;

/// Subscription tier of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Plan {
    Free,
    Starter,
    Exclusive,
}

impl Plan {
    pub fn as_str(&self) -> &'static str {
        match self {
            Plan::Free => "Free",
            Plan::Starter => "Starter",
            Plan::Exclusive => "Exclusive",
        }
    }

    /// Parse a plan tag; anything unrecognised falls back to the most restrictive plan
    pub fn parse(tag: &str) -> Self {
        match tag.trim() {
            "Free" => Plan::Free,
            "Starter" => Plan::Starter,
            "Exclusive" => Plan::Exclusive,
            other => {
                tracing::debug!("Unrecognised plan tag '{}', using Free limits", other);
                Plan::Free
            }
        }
    }
}

impl Default for Plan {
    fn default() -> Self {
        Plan::Free
    }
}

impl std::fmt::Display for Plan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Quotas and feature switches of one plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanLimits {
    /// Orders allowed per calendar month, `UNLIMITED` for no ceiling
    pub monthly_orders: i64,
    /// Products allowed across both inventories, `UNLIMITED` for no ceiling
    pub max_products: i64,
    pub can_use_online_store: bool,
    pub can_use_whatsapp_integration: bool,
    pub can_export_reports: bool,
    pub priority_support: bool,
}

/// Boolean features a plan may grant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanFeature {
    OnlineStore,
    WhatsappIntegration,
    ExportReports,
    PrioritySupport,
}

const FREE: PlanLimits = PlanLimits {
    monthly_orders: 10,
    max_products: 30,
    can_use_online_store: true,
    can_use_whatsapp_integration: false,
    can_export_reports: false,
    priority_support: false,
};

const STARTER: PlanLimits = PlanLimits {
    monthly_orders: 40,
    max_products: 200,
    can_use_online_store: true,
    can_use_whatsapp_integration: false,
    can_export_reports: true,
    priority_support: true,
};

const EXCLUSIVE: PlanLimits = PlanLimits {
    monthly_orders: UNLIMITED,
    max_products: UNLIMITED,
    can_use_online_store: true,
    can_use_whatsapp_integration: true,
    can_export_reports: true,
    priority_support: true,
};

pub fn limits_for(plan: Plan) -> PlanLimits {
    match plan {
        Plan::Free => FREE,
        Plan::Starter => STARTER,
        Plan::Exclusive => EXCLUSIVE,
    }
}

/// `current < limit`, always true for `UNLIMITED`
///
/// The limit is the number of items allowed: with a limit of 10 and 10 already
/// used, the next one is rejected.
pub fn is_within_limit(current: i64, limit: i64) -> bool {
    if limit == UNLIMITED {
        return true;
    }
    current < limit
}

pub fn can_create_order(plan: Plan, current_monthly_orders: i64) -> bool {
    is_within_limit(current_monthly_orders, limits_for(plan).monthly_orders)
}

pub fn can_add_product(plan: Plan, current_products: i64) -> bool {
    is_within_limit(current_products, limits_for(plan).max_products)
}

pub fn has_feature(plan: Plan, feature: PlanFeature) -> bool {
    let limits = limits_for(plan);
    match feature {
        PlanFeature::OnlineStore => limits.can_use_online_store,
        PlanFeature::WhatsappIntegration => limits.can_use_whatsapp_integration,
        PlanFeature::ExportReports => limits.can_export_reports,
        PlanFeature::PrioritySupport => limits.priority_support,
    }
}
