// Realtime events over Redis pub/sub
//
// The websocket gateway subscribes to `realtime:*` and forwards each envelope
// to the sockets joined to the room named by the channel suffix.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::Serialize;
use uuid::Uuid;

use crate::notifications::NotificationError;

pub const EVENT_ORDER_CREATED: &str = "order:created";
pub const EVENT_ORDER_UPDATED: &str = "order:updated";
pub const EVENT_LOW_STOCK: &str = "product:low-stock";

const CHANNEL_PREFIX: &str = "realtime";

pub fn store_room(store_id: Uuid) -> String {
    format!("store:{}", store_id)
}

pub fn user_room(user_id: Uuid) -> String {
    format!("user:{}", user_id)
}

#[async_trait]
pub trait RealtimePublisher: Send + Sync {
    async fn publish(
        &self,
        room: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), NotificationError>;
}

#[derive(Serialize)]
struct Envelope<'a> {
    room: &'a str,
    event: &'a str,
    payload: serde_json::Value,
}

/// Publishes JSON envelopes to `realtime:{room}`
#[derive(Clone)]
pub struct RedisRealtimePublisher {
    conn: ConnectionManager,
}

impl RedisRealtimePublisher {
    pub async fn connect(url: &str) -> Result<Self, NotificationError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        tracing::info!("Realtime publisher connected to Redis");
        Ok(Self { conn })
    }
}

#[async_trait]
impl RealtimePublisher for RedisRealtimePublisher {
    async fn publish(
        &self,
        room: &str,
        event: &str,
        payload: serde_json::Value,
    ) -> Result<(), NotificationError> {
        let body = serde_json::to_string(&Envelope {
            room,
            event,
            payload,
        })?;
        let channel = format!("{}:{}", CHANNEL_PREFIX, room);

        let mut conn = self.conn.clone();
        let receivers: i64 = conn.publish(&channel, body).await?;
        tracing::debug!("Published {} to {} ({} receivers)", event, channel, receivers);
        Ok(())
    }
}

/// Used when no Redis URL is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledRealtime;

#[async_trait]
impl RealtimePublisher for DisabledRealtime {
    async fn publish(
        &self,
        room: &str,
        event: &str,
        _payload: serde_json::Value,
    ) -> Result<(), NotificationError> {
        tracing::debug!("Realtime disabled, dropping {} for {}", event, room);
        Ok(())
    }
}
