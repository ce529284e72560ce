// Best-effort side channels fired after an order write has committed.
//
// Nothing in here may fail an order operation: every channel error is logged
// at warn and dropped.

pub mod push;
pub mod realtime;

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::inventory::stock::StockAdjustment;
use crate::orders::models::{Order, OrderDetails};
use crate::stores::Store;

pub use push::*;
pub use realtime::*;

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Realtime publish failed: {0}")]
    Realtime(String),

    #[error("Push delivery failed: {0}")]
    Push(String),

    #[error("Token lookup failed: {0}")]
    TokenLookup(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<redis::RedisError> for NotificationError {
    fn from(err: redis::RedisError) -> Self {
        NotificationError::Realtime(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Push(err.to_string())
    }
}

impl From<sqlx::Error> for NotificationError {
    fn from(err: sqlx::Error) -> Self {
        NotificationError::TokenLookup(err.to_string())
    }
}

impl From<serde_json::Error> for NotificationError {
    fn from(err: serde_json::Error) -> Self {
        NotificationError::Serialization(err.to_string())
    }
}

/// Format minor units as Brazilian reais, e.g. `R$ 1.234,56`
pub fn format_money(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let major = (abs / 100).to_string();
    let cents = abs % 100;

    let mut grouped = String::with_capacity(major.len() + major.len() / 3);
    for (i, ch) in major.chars().enumerate() {
        if i > 0 && (major.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    format!("{}R$ {},{:02}", sign, grouped, cents)
}

/// Order fields carried by realtime events
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub id: Uuid,
    pub order_number: String,
    pub status: String,
    pub total: i64,
    pub customer_name: Option<String>,
    pub is_delivery: bool,
    pub item_count: usize,
    pub created_at: DateTime<Utc>,
}

impl OrderSummary {
    pub fn new(order: &Order, item_count: usize) -> Self {
        Self {
            id: order.id,
            order_number: order.order_number.clone(),
            status: order.status.clone(),
            total: order.total,
            customer_name: order.customer_name.clone(),
            is_delivery: order.is_delivery,
            item_count,
            created_at: order.created_at,
        }
    }
}

/// How fan-out work is run relative to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchMode {
    /// Spawned onto the runtime and never awaited
    Detached,
    /// Awaited in place, errors still swallowed
    Inline,
}

#[derive(Clone)]
pub struct NotificationFanout {
    realtime: Arc<dyn RealtimePublisher>,
    tokens: Arc<dyn PushTokenDirectory>,
    push: Arc<dyn PushDispatcher>,
    mode: DispatchMode,
}

impl NotificationFanout {
    pub fn new(
        realtime: Arc<dyn RealtimePublisher>,
        tokens: Arc<dyn PushTokenDirectory>,
        push: Arc<dyn PushDispatcher>,
        mode: DispatchMode,
    ) -> Self {
        Self {
            realtime,
            tokens,
            push,
            mode,
        }
    }

    async fn dispatch<F>(&self, label: &'static str, task: F)
    where
        F: Future<Output = Result<(), NotificationError>> + Send + 'static,
    {
        let guarded = async move {
            if let Err(e) = task.await {
                tracing::warn!("Notification '{}' failed: {}", label, e);
            }
        };

        match self.mode {
            DispatchMode::Detached => {
                tokio::spawn(guarded);
            }
            DispatchMode::Inline => guarded.await,
        }
    }

    /// Push to every device of the store, skipping the dispatcher when none is registered
    async fn push_to_store(
        tokens: Arc<dyn PushTokenDirectory>,
        push: Arc<dyn PushDispatcher>,
        store_id: Uuid,
        message: PushMessage,
    ) -> Result<(), NotificationError> {
        let grouped = tokens.grouped_for_store(store_id).await?;
        if grouped.is_empty() {
            tracing::debug!("Store {} has no push tokens", store_id);
            return Ok(());
        }
        push.send_to_grouped_tokens(&grouped, &message).await
    }

    /// Online checkout: realtime event to the owner and a push with the total
    pub async fn order_created_online(&self, store: &Store, details: &OrderDetails) {
        let summary = OrderSummary::new(&details.order, details.items.len());
        let room = user_room(store.user_id);
        let realtime = self.realtime.clone();
        let payload = serde_json::to_value(&summary);

        self.dispatch("order created event", async move {
            realtime.publish(&room, EVENT_ORDER_CREATED, payload?).await
        })
        .await;

        let customer = details
            .order
            .customer_name
            .clone()
            .unwrap_or_else(|| "A customer".to_string());
        let message = PushMessage {
            title: "New order received".to_string(),
            body: format!(
                "{} placed order {} totalling {}",
                customer,
                details.order.order_number,
                format_money(details.order.total)
            ),
            data: BTreeMap::from([
                ("type".to_string(), "order:created".to_string()),
                ("orderId".to_string(), details.order.id.to_string()),
            ]),
        };
        let (tokens, push, store_id) = (self.tokens.clone(), self.push.clone(), store.id);

        self.dispatch("order created push", async move {
            Self::push_to_store(tokens, push, store_id, message).await
        })
        .await;
    }

    pub async fn order_updated(&self, store_id: Uuid, order: &Order) {
        let payload = serde_json::to_value(OrderSummary::new(order, 0));
        let realtime = self.realtime.clone();

        self.dispatch("order updated event", async move {
            realtime
                .publish(&store_room(store_id), EVENT_ORDER_UPDATED, payload?)
                .await
        })
        .await;
    }

    /// One event and one push per adjustment that crossed the low-stock threshold
    pub async fn low_stock(&self, adjustments: &[StockAdjustment]) {
        for adjustment in adjustments.iter().filter(|a| a.low_stock) {
            let store_id = adjustment.store_id;
            let payload = serde_json::to_value(adjustment);
            let realtime = self.realtime.clone();

            self.dispatch("low stock event", async move {
                realtime
                    .publish(&store_room(store_id), EVENT_LOW_STOCK, payload?)
                    .await
            })
            .await;

            let message = PushMessage {
                title: "Low stock".to_string(),
                body: format!(
                    "{} has only {} units left",
                    adjustment.name, adjustment.new_quantity
                ),
                data: BTreeMap::from([
                    ("type".to_string(), EVENT_LOW_STOCK.to_string()),
                    ("productId".to_string(), adjustment.product_ref.id().to_string()),
                ]),
            };
            let (tokens, push) = (self.tokens.clone(), self.push.clone());

            self.dispatch("low stock push", async move {
                Self::push_to_store(tokens, push, store_id, message).await
            })
            .await;
        }
    }
}
