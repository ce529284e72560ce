// In-memory collaborators for service and HTTP tests

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::analytics::AnalyticsService;
use crate::auth::{Claims, TokenService};
use crate::clock::{Clock, DateRange, FixedClock};
use crate::inventory::models::{
    CatalogProduct, NewCustomProduct, NewStoreProduct, ProductRef, StoreProduct,
    StoreProductCustom, STATUS_ACTIVE,
};
use crate::inventory::repository::{CatalogInventory, CatalogReader, CustomInventory};
use crate::inventory::service::ProductService;
use crate::notifications::{
    DispatchMode, GroupedTokens, NotificationError, NotificationFanout, PushDispatcher,
    PushMessage, PushTokenDirectory, RealtimePublisher,
};
use crate::orders::error::OrderError;
use crate::orders::models::{NewOrder, NewOrderItem, Order, OrderDetails, OrderItem, STATUS_APPROVED};
use crate::orders::number::OrderNumberGenerator;
use crate::orders::query::OrderFilters;
use crate::orders::repository::{OrderPage, OrderStore};
use crate::orders::service::OrderService;
use crate::plans::PlanLimitsService;
use crate::stores::{Store, StoreDirectory};
use crate::AppState;

pub const TEST_JWT_SECRET: &str = "test_secret_key_for_testing_purposes";

/// 2025-05-20 12:00 UTC
pub fn test_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 5, 20, 12, 0, 0).unwrap()
}

/// HS256-sign arbitrary claims with `secret`
pub fn sign_claims(secret: &str, claims: &Claims) -> String {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

/// Fifteen-minute access token as the account service issues it
pub fn sign_token(secret: &str, user_id: Uuid, email: &str, plan: Option<&str>) -> String {
    let now = Utc::now().timestamp();
    sign_claims(
        secret,
        &Claims {
            sub: user_id,
            email: email.to_string(),
            plan: plan.map(str::to_string),
            iat: now,
            exp: now + 900,
        },
    )
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn store(plan: &str) -> Store {
    let id = Uuid::new_v4();
    Store {
        id,
        name: "Perfumaria Teste".to_string(),
        subdomain: format!("store-{}", &id.simple().to_string()[..8]),
        user_id: Uuid::new_v4(),
        plan: plan.to_string(),
        created_at: test_now(),
        updated_at: test_now(),
    }
}

pub fn catalog_product(store_id: Uuid, name: &str, price: i64, quantity: i32) -> StoreProduct {
    StoreProduct {
        id: Uuid::new_v4(),
        store_id,
        catalog_id: rand::random::<u32>() as i64,
        name: name.to_string(),
        brand: "Acme Brand".to_string(),
        company: "Acme".to_string(),
        category: None,
        img_url: Some(format!("https://img.example.com/{}.png", name)),
        price,
        catalog_price: price,
        quantity,
        cost_price: None,
        validity_date: None,
        status: STATUS_ACTIVE.to_string(),
        created_at: test_now(),
        updated_at: test_now(),
    }
}

pub fn custom_product(store_id: Uuid, name: &str, price: i64, quantity: i32) -> StoreProductCustom {
    StoreProductCustom {
        id: Uuid::new_v4(),
        store_id,
        name: name.to_string(),
        company: None,
        category: None,
        img_url: None,
        price,
        quantity,
        cost_price: None,
        status: STATUS_ACTIVE.to_string(),
        created_at: test_now(),
        updated_at: test_now(),
    }
}

pub fn catalog_template(id: i64, name: &str, normal_price: i64, suggested_price: i64) -> CatalogProduct {
    CatalogProduct {
        id,
        name: name.to_string(),
        brand: "Acme Brand".to_string(),
        company: "Acme".to_string(),
        category: Some("fragrance".to_string()),
        normal_price,
        suggested_price,
        barcode: None,
        img_url: None,
    }
}

fn order_row(store_id: Uuid, created_at: DateTime<Utc>, status: &str, total: i64) -> Order {
    Order {
        id: Uuid::new_v4(),
        order_number: format!("ORD-SEED-{}", Uuid::new_v4().simple()),
        store_id,
        status: status.to_string(),
        customer_name: None,
        customer_phone: None,
        payment_method: "cash".to_string(),
        total,
        is_delivery: false,
        delivery_street: None,
        delivery_number: None,
        delivery_neighborhood: None,
        created_at,
        updated_at: created_at,
    }
}

/// Order with a single custom line
pub fn sample_order(store_id: Uuid, total: i64) -> OrderDetails {
    let order = Order {
        customer_name: Some("Ana".to_string()),
        ..order_row(store_id, test_now(), STATUS_APPROVED, total)
    };
    let item = OrderItem {
        id: Uuid::new_v4(),
        order_id: order.id,
        product_type: crate::inventory::models::ProductType::Custom,
        store_product_id: None,
        store_product_custom_id: Some(Uuid::new_v4()),
        name: "Soap".to_string(),
        img_url: None,
        price: total,
        quantity: 1,
    };
    OrderDetails {
        order,
        items: vec![item],
    }
}

/// Insert an order without items
pub fn seed_order(
    orders: &MemoryOrderStore,
    store_id: Uuid,
    created_at: DateTime<Utc>,
    status: &str,
    total: i64,
) -> Order {
    let order = order_row(store_id, created_at, status, total);
    orders.orders.lock().unwrap().push(order.clone());
    order
}

/// Insert `count` approved orders of 1000 at `created_at`
pub fn seed_orders(orders: &MemoryOrderStore, store_id: Uuid, created_at: DateTime<Utc>, count: usize) {
    for _ in 0..count {
        seed_order(orders, store_id, created_at, STATUS_APPROVED, 1_000);
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryInventory {
    catalog: Mutex<HashMap<Uuid, StoreProduct>>,
    custom: Mutex<HashMap<Uuid, StoreProductCustom>>,
    templates: Mutex<HashMap<i64, CatalogProduct>>,
}

impl MemoryInventory {
    pub fn insert_catalog(&self, product: StoreProduct) {
        self.catalog.lock().unwrap().insert(product.id, product);
    }

    pub fn insert_custom(&self, product: StoreProductCustom) {
        self.custom.lock().unwrap().insert(product.id, product);
    }

    pub fn insert_template(&self, template: CatalogProduct) {
        self.templates.lock().unwrap().insert(template.id, template);
    }

    pub fn remove_custom(&self, id: Uuid) {
        self.custom.lock().unwrap().remove(&id);
    }

    pub fn catalog_quantity(&self, id: Uuid) -> Option<i32> {
        self.catalog.lock().unwrap().get(&id).map(|p| p.quantity)
    }

    pub fn custom_quantity(&self, id: Uuid) -> Option<i32> {
        self.custom.lock().unwrap().get(&id).map(|p| p.quantity)
    }

    pub fn quantity(&self, product_ref: ProductRef) -> Option<i32> {
        match product_ref {
            ProductRef::Catalog(id) => self.catalog_quantity(id),
            ProductRef::Custom(id) => self.custom_quantity(id),
        }
    }
}

#[async_trait]
impl CatalogInventory for MemoryInventory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoreProduct>, OrderError> {
        Ok(self.catalog.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_catalog_id(
        &self,
        store_id: Uuid,
        catalog_id: i64,
    ) -> Result<Option<StoreProduct>, OrderError> {
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .values()
            .find(|p| p.store_id == store_id && p.catalog_id == catalog_id)
            .cloned())
    }

    async fn adjust_quantity(&self, id: Uuid, new_quantity: i32) -> Result<(), OrderError> {
        if let Some(product) = self.catalog.lock().unwrap().get_mut(&id) {
            product.quantity = new_quantity;
        }
        Ok(())
    }

    async fn create(&self, product: NewStoreProduct) -> Result<StoreProduct, OrderError> {
        let created = StoreProduct {
            id: Uuid::new_v4(),
            store_id: product.store_id,
            catalog_id: product.catalog_id,
            name: product.name,
            brand: product.brand,
            company: product.company,
            category: product.category,
            img_url: product.img_url,
            price: product.price,
            catalog_price: product.catalog_price,
            quantity: product.quantity,
            cost_price: product.cost_price,
            validity_date: product.validity_date,
            status: STATUS_ACTIVE.to_string(),
            created_at: test_now(),
            updated_at: test_now(),
        };
        self.insert_catalog(created.clone());
        Ok(created)
    }

    async fn count_for_store(&self, store_id: Uuid) -> Result<i64, OrderError> {
        Ok(self
            .catalog
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.store_id == store_id)
            .count() as i64)
    }
}

#[async_trait]
impl CustomInventory for MemoryInventory {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoreProductCustom>, OrderError> {
        Ok(self.custom.lock().unwrap().get(&id).cloned())
    }

    async fn adjust_quantity(&self, id: Uuid, new_quantity: i32) -> Result<(), OrderError> {
        if let Some(product) = self.custom.lock().unwrap().get_mut(&id) {
            product.quantity = new_quantity;
        }
        Ok(())
    }

    async fn create(&self, product: NewCustomProduct) -> Result<StoreProductCustom, OrderError> {
        let created = StoreProductCustom {
            id: Uuid::new_v4(),
            store_id: product.store_id,
            name: product.name,
            company: product.company,
            category: product.category,
            img_url: product.img_url,
            price: product.price,
            quantity: product.quantity,
            cost_price: product.cost_price,
            status: STATUS_ACTIVE.to_string(),
            created_at: test_now(),
            updated_at: test_now(),
        };
        self.insert_custom(created.clone());
        Ok(created)
    }

    async fn count_for_store(&self, store_id: Uuid) -> Result<i64, OrderError> {
        Ok(self
            .custom
            .lock()
            .unwrap()
            .values()
            .filter(|p| p.store_id == store_id)
            .count() as i64)
    }
}

#[async_trait]
impl CatalogReader for MemoryInventory {
    async fn find_by_id(&self, id: i64) -> Result<Option<CatalogProduct>, OrderError> {
        Ok(self.templates.lock().unwrap().get(&id).cloned())
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

pub struct MemoryOrderStore {
    orders: Mutex<Vec<Order>>,
    items: Mutex<Vec<OrderItem>>,
    now: DateTime<Utc>,
}

impl Default for MemoryOrderStore {
    fn default() -> Self {
        Self::at(Utc::now())
    }
}

impl MemoryOrderStore {
    /// Orders inserted without a creation time get `now`
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            orders: Mutex::new(Vec::new()),
            items: Mutex::new(Vec::new()),
            now,
        }
    }

    pub fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    /// Overwrite a stored order with the same id
    pub fn replace(&self, order: Order) {
        let mut orders = self.orders.lock().unwrap();
        if let Some(existing) = orders.iter_mut().find(|o| o.id == order.id) {
            *existing = order;
        }
    }

    fn newest_first(&self, store_id: Uuid, keep: impl Fn(&Order) -> bool) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.store_id == store_id && keep(o))
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        orders
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, order: NewOrder, items: Vec<NewOrderItem>) -> Result<OrderDetails, OrderError> {
        let created_at = order.created_at.unwrap_or(self.now);
        let order = Order {
            id: Uuid::new_v4(),
            order_number: order.order_number,
            store_id: order.store_id,
            status: order.status,
            customer_name: order.customer_name,
            customer_phone: order.customer_phone,
            payment_method: order.payment_method,
            total: order.total,
            is_delivery: order.is_delivery,
            delivery_street: order.delivery_street,
            delivery_number: order.delivery_number,
            delivery_neighborhood: order.delivery_neighborhood,
            created_at,
            updated_at: created_at,
        };

        let items: Vec<OrderItem> = items
            .into_iter()
            .map(|item| {
                let (store_product_id, store_product_custom_id) = match item.product_ref {
                    ProductRef::Catalog(id) => (Some(id), None),
                    ProductRef::Custom(id) => (None, Some(id)),
                };
                OrderItem {
                    id: Uuid::new_v4(),
                    order_id: order.id,
                    product_type: item.product_ref.product_type(),
                    store_product_id,
                    store_product_custom_id,
                    name: item.name,
                    img_url: item.img_url,
                    price: item.price,
                    quantity: item.quantity,
                }
            })
            .collect();

        self.orders.lock().unwrap().push(order.clone());
        self.items.lock().unwrap().extend(items.iter().cloned());
        Ok(OrderDetails { order, items })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, OrderError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn find_items(&self, order_id: Uuid) -> Result<Vec<OrderItem>, OrderError> {
        self.items_for_orders(&[order_id]).await
    }

    async fn items_for_orders(&self, order_ids: &[Uuid]) -> Result<Vec<OrderItem>, OrderError> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|i| order_ids.contains(&i.order_id))
            .cloned()
            .collect())
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<Order, OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(OrderError::OrderNotFound)?;
        order.status = status.to_string();
        order.updated_at = self.now;
        Ok(order.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<(), OrderError> {
        let mut orders = self.orders.lock().unwrap();
        let before = orders.len();
        orders.retain(|o| o.id != id);
        if orders.len() == before {
            return Err(OrderError::OrderNotFound);
        }
        self.items.lock().unwrap().retain(|i| i.order_id != id);
        Ok(())
    }

    async fn count_in_range(&self, store_id: Uuid, range: &DateRange) -> Result<i64, OrderError> {
        Ok(self.newest_first(store_id, |o| range.contains(o.created_at)).len() as i64)
    }

    async fn list_paginated(&self, store_id: Uuid, filters: &OrderFilters) -> Result<OrderPage, OrderError> {
        let search = filters.search.as_ref().map(|s| s.to_lowercase());
        let matching = self.newest_first(store_id, |o| {
            let name_matches = match (&search, &o.customer_name) {
                (Some(needle), Some(name)) => name.to_lowercase().contains(needle),
                (Some(_), None) => false,
                (None, _) => true,
            };
            let status_matches = filters.status.as_ref().map_or(true, |s| &o.status == s);
            let in_range = filters.range.map_or(true, |r| r.contains(o.created_at));
            name_matches && status_matches && in_range
        });

        let total = matching.len() as i64;
        let orders = matching
            .into_iter()
            .skip(filters.offset())
            .take(filters.limit as usize)
            .collect();
        Ok(OrderPage { orders, total })
    }

    async fn list_all(&self, store_id: Uuid, range: Option<&DateRange>) -> Result<Vec<Order>, OrderError> {
        Ok(self.newest_first(store_id, |o| range.map_or(true, |r| r.contains(o.created_at))))
    }

    async fn recent(&self, store_id: Uuid, limit: i64) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.newest_first(store_id, |_| true);
        orders.truncate(limit.max(0) as usize);
        Ok(orders)
    }
}

/// `ORD-TEST-1`, `ORD-TEST-2`, ...
#[derive(Default)]
pub struct SequentialOrderNumbers(AtomicU64);

impl OrderNumberGenerator for SequentialOrderNumbers {
    fn next(&self) -> String {
        format!("ORD-TEST-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

// ---------------------------------------------------------------------------
// Stores
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MemoryStoreDirectory(Mutex<Vec<Store>>);

impl MemoryStoreDirectory {
    pub fn insert(&self, store: Store) {
        self.0.lock().unwrap().push(store);
    }
}

#[async_trait]
impl StoreDirectory for MemoryStoreDirectory {
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Store>, OrderError> {
        Ok(self.0.lock().unwrap().iter().find(|s| s.user_id == user_id).cloned())
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Store>, OrderError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.subdomain == subdomain)
            .cloned())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingRealtime(Mutex<Vec<(String, String, serde_json::Value)>>);

impl RecordingRealtime {
    pub fn events(&self) -> Vec<(String, String, serde_json::Value)> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl RealtimePublisher for RecordingRealtime {
    async fn publish(
        &self,
        room: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), NotificationError> {
        self.0
            .lock()
            .unwrap()
            .push((room.to_string(), event.to_string(), payload));
        Ok(())
    }
}

pub struct FailingRealtime;

#[async_trait]
impl RealtimePublisher for FailingRealtime {
    async fn publish(
        &self,
        _room: &str,
        _event: &str,
        _payload: serde_json::Value,
    ) -> Result<(), NotificationError> {
        Err(NotificationError::Realtime("connection refused".to_string()))
    }
}

#[derive(Default)]
pub struct RecordingPush(Mutex<Vec<PushMessage>>);

impl RecordingPush {
    pub fn messages(&self) -> Vec<PushMessage> {
        self.0.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushDispatcher for RecordingPush {
    async fn send_to_grouped_tokens(
        &self,
        _tokens: &GroupedTokens,
        message: &PushMessage,
    ) -> Result<(), NotificationError> {
        self.0.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// The same tokens for every store
#[derive(Default)]
pub struct StaticTokens(BTreeMap<String, Vec<String>>);

impl StaticTokens {
    pub fn with(provider: &str, token: &str) -> Self {
        Self(BTreeMap::from([(provider.to_string(), vec![token.to_string()])]))
    }
}

#[async_trait]
impl PushTokenDirectory for StaticTokens {
    async fn grouped_for_store(&self, _store_id: Uuid) -> Result<GroupedTokens, NotificationError> {
        let mut grouped = GroupedTokens::default();
        for (provider, tokens) in &self.0 {
            for token in tokens {
                grouped.push(provider, token.clone());
            }
        }
        Ok(grouped)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

/// Services wired to in-memory collaborators, one store registered
pub struct Harness {
    pub store: Store,
    pub clock: Arc<FixedClock>,
    pub inventory: Arc<MemoryInventory>,
    pub orders: Arc<MemoryOrderStore>,
    pub stores: Arc<MemoryStoreDirectory>,
    pub realtime: Arc<RecordingRealtime>,
    pub push: Arc<RecordingPush>,
    pub service: OrderService,
    pub products: ProductService,
    pub analytics: AnalyticsService,
    pub limits: PlanLimitsService,
}

impl Harness {
    pub fn new(store: Store) -> Self {
        Self::build(store, None)
    }

    pub fn with_failing_realtime(store: Store) -> Self {
        Self::build(store, Some(Arc::new(FailingRealtime)))
    }

    fn build(store: Store, realtime_override: Option<Arc<dyn RealtimePublisher>>) -> Self {
        let clock = Arc::new(FixedClock(test_now()));
        let inventory = Arc::new(MemoryInventory::default());
        let orders = Arc::new(MemoryOrderStore::at(clock.now()));
        let stores = Arc::new(MemoryStoreDirectory::default());
        stores.insert(store.clone());
        let realtime = Arc::new(RecordingRealtime::default());
        let push = Arc::new(RecordingPush::default());

        let fanout = NotificationFanout::new(
            realtime_override.unwrap_or_else(|| realtime.clone() as Arc<dyn RealtimePublisher>),
            Arc::new(StaticTokens::with("expo", "ExponentPushToken[test]")),
            push.clone(),
            DispatchMode::Inline,
        );

        let limits = PlanLimitsService::new(
            orders.clone(),
            inventory.clone(),
            inventory.clone(),
            clock.clone(),
        );
        let service = OrderService::new(
            stores.clone(),
            orders.clone(),
            inventory.clone(),
            inventory.clone(),
            Arc::new(SequentialOrderNumbers::default()),
            clock.clone(),
            fanout,
        );
        let products = ProductService::new(
            stores.clone(),
            inventory.clone(),
            inventory.clone(),
            inventory.clone(),
            limits.clone(),
        );
        let analytics = AnalyticsService::new(
            stores.clone(),
            orders.clone(),
            inventory.clone(),
            inventory.clone(),
            clock.clone(),
        );

        Self {
            store,
            clock,
            inventory,
            orders,
            stores,
            realtime,
            push,
            service,
            products,
            analytics,
            limits,
        }
    }

    /// Application state over the same collaborators
    pub fn state(&self) -> AppState {
        AppState {
            order_service: self.service.clone(),
            product_service: self.products.clone(),
            analytics_service: self.analytics.clone(),
            plan_limits: self.limits.clone(),
            stores: self.stores.clone(),
            token_service: Arc::new(TokenService::new(TEST_JWT_SECRET)),
        }
    }

    /// `Authorization` header value for the harness store's owner
    pub fn bearer(&self, plan: Option<&str>) -> String {
        let token = sign_token(TEST_JWT_SECRET, self.store.user_id, "owner@example.com", plan);
        format!("Bearer {}", token)
    }
}
