pub mod analytics;
pub mod auth;
pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod inventory;
pub mod notifications;
pub mod orders;
pub mod plans;
pub mod stores;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

use axum::{
    extract::FromRef,
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::analytics::AnalyticsService;
use crate::auth::TokenService;
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::inventory::{PgCatalogInventory, PgCatalogReader, PgCustomInventory, ProductService};
use crate::notifications::{
    DisabledRealtime, DispatchMode, ExpoPushProvider, FcmPushProvider, MultiProviderDispatcher,
    NotificationFanout, PgPushTokenDirectory, RealtimePublisher, RedisRealtimePublisher,
};
use crate::orders::{OrderService, PgOrderStore, TimestampOrderNumbers};
use crate::plans::PlanLimitsService;
use crate::stores::{PgStoreDirectory, StoreDirectory};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        orders::handlers::create_order_handler,
        orders::handlers::create_online_order_handler,
        orders::handlers::update_order_status_handler,
        orders::handlers::delete_order_handler,
        orders::handlers::recent_sales_handler,
        analytics::handlers::dashboard_handler,
        analytics::handlers::dashboard_paginated_handler,
        analytics::handlers::metrics_handler,
        analytics::handlers::monthly_summary_handler,
        inventory::handlers::add_catalog_product_handler,
        inventory::handlers::create_custom_product_handler,
        plans::handlers::plan_usage_handler,
    ),
    components(
        schemas(
            orders::Order,
            orders::OrderItem,
            orders::OrderDetails,
            orders::OrderLineRequest,
            orders::CreateOrderRequest,
            orders::UpdateStatusRequest,
            inventory::ProductType,
            inventory::StoreProduct,
            inventory::StoreProductCustom,
            inventory::AddCatalogProductRequest,
            inventory::CreateCustomProductRequest,
            analytics::SalesTotals,
            analytics::Dashboard,
            analytics::Pagination,
            analytics::PaginatedDashboard,
            analytics::PeriodDelta,
            analytics::Period,
            analytics::PreviousPeriod,
            analytics::SalesMetrics,
            analytics::BrandRevenue,
            analytics::MonthSummary,
            plans::Plan,
            plans::PlanLimits,
            plans::PlanUsageSnapshot,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "orders", description = "Sales and online checkout"),
        (name = "dashboard", description = "Sales reporting"),
        (name = "products", description = "Stocking catalog and custom products"),
        (name = "plan", description = "Subscription plan usage")
    ),
    info(
        title = "Storefront API",
        version = "1.0.0",
        description = "Multi-tenant storefront orders, inventory and sales analytics"
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub order_service: OrderService,
    pub product_service: ProductService,
    pub analytics_service: AnalyticsService,
    pub plan_limits: PlanLimitsService,
    pub stores: Arc<dyn StoreDirectory>,
    pub token_service: Arc<TokenService>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.token_service.clone()
    }
}

impl AppState {
    /// Wire the Postgres repositories and the configured notification channels
    pub async fn build(pool: PgPool, config: &AppConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let stores: Arc<dyn StoreDirectory> = Arc::new(PgStoreDirectory::new(pool.clone()));
        let orders = Arc::new(PgOrderStore::new(pool.clone()));
        let catalog = Arc::new(PgCatalogInventory::new(pool.clone()));
        let custom = Arc::new(PgCustomInventory::new(pool.clone()));

        let fanout = NotificationFanout::new(
            realtime_publisher(config).await,
            Arc::new(PgPushTokenDirectory::new(pool.clone())),
            Arc::new(push_dispatcher(config)),
            DispatchMode::Detached,
        );

        let plan_limits =
            PlanLimitsService::new(orders.clone(), catalog.clone(), custom.clone(), clock.clone());

        Self {
            order_service: OrderService::new(
                stores.clone(),
                orders.clone(),
                catalog.clone(),
                custom.clone(),
                Arc::new(TimestampOrderNumbers::new(clock.clone())),
                clock.clone(),
                fanout,
            ),
            product_service: ProductService::new(
                stores.clone(),
                Arc::new(PgCatalogReader::new(pool)),
                catalog.clone(),
                custom.clone(),
                plan_limits.clone(),
            ),
            analytics_service: AnalyticsService::new(stores.clone(), orders, catalog, custom, clock),
            plan_limits,
            stores,
            token_service: Arc::new(TokenService::new(&config.jwt_secret)),
        }
    }
}

async fn realtime_publisher(config: &AppConfig) -> Arc<dyn RealtimePublisher> {
    let Some(url) = config.redis_url.as_deref() else {
        tracing::info!("REDIS_URL not set, realtime events disabled");
        return Arc::new(DisabledRealtime);
    };

    match RedisRealtimePublisher::connect(url).await {
        Ok(publisher) => {
            tracing::info!("Realtime events published through Redis");
            Arc::new(publisher)
        }
        Err(e) => {
            tracing::warn!("Redis unavailable, realtime events disabled: {}", e);
            Arc::new(DisabledRealtime)
        }
    }
}

fn push_dispatcher(config: &AppConfig) -> MultiProviderDispatcher {
    let mut dispatcher = MultiProviderDispatcher::new();
    if let Some(token) = &config.expo_access_token {
        dispatcher = dispatcher.with_provider(Arc::new(ExpoPushProvider::new(token.clone())));
    }
    if let Some(key) = &config.fcm_server_key {
        dispatcher = dispatcher.with_provider(Arc::new(FcmPushProvider::new(key.clone())));
    }
    if !dispatcher.has_providers() {
        tracing::warn!("No push provider configured, push notifications are dropped");
    }
    dispatcher
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS and tracing middleware
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/orders", post(orders::create_order_handler))
        .route("/api/orders/recent", get(orders::recent_sales_handler))
        .route("/api/orders/:id", delete(orders::delete_order_handler))
        .route("/api/orders/:id/status", patch(orders::update_order_status_handler))
        .route(
            "/api/stores/:subdomain/orders",
            post(orders::create_online_order_handler),
        )
        .route("/api/dashboard", get(analytics::dashboard_handler))
        .route("/api/dashboard/paginated", get(analytics::dashboard_paginated_handler))
        .route("/api/dashboard/metrics", get(analytics::metrics_handler))
        .route("/api/dashboard/monthly", get(analytics::monthly_summary_handler))
        .route("/api/products/catalog", post(inventory::add_catalog_product_handler))
        .route("/api/products/custom", post(inventory::create_custom_product_handler))
        .route("/api/plan/usage", get(plans::plan_usage_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
