// Push notifications to the store owner's registered devices

use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::notifications::NotificationError;

const EXPO_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";
const FCM_ENDPOINT: &str = "https://fcm.googleapis.com/fcm/send";
/// Legacy FCM accepts at most this many messages per request
pub const FCM_BATCH_SIZE: usize = 1000;

/// Title, body and string data of one push notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushMessage {
    pub title: String,
    pub body: String,
    pub data: BTreeMap<String, String>,
}

/// Active device tokens keyed by provider name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedTokens(BTreeMap<String, Vec<String>>);

impl GroupedTokens {
    pub fn push(&mut self, provider: &str, token: String) {
        self.0
            .entry(provider.to_ascii_lowercase())
            .or_default()
            .push(token);
    }

    pub fn is_empty(&self) -> bool {
        self.0.values().all(|tokens| tokens.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }
}

impl FromIterator<PushTokenRow> for GroupedTokens {
    fn from_iter<I: IntoIterator<Item = PushTokenRow>>(rows: I) -> Self {
        let mut grouped = GroupedTokens::default();
        for row in rows {
            grouped.push(&row.provider, row.token);
        }
        grouped
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct PushTokenRow {
    pub token: String,
    pub provider: String,
}

#[async_trait]
pub trait PushTokenDirectory: Send + Sync {
    async fn grouped_for_store(&self, store_id: Uuid) -> Result<GroupedTokens, NotificationError>;
}

#[derive(Clone)]
pub struct PgPushTokenDirectory {
    pool: PgPool,
}

impl PgPushTokenDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PushTokenDirectory for PgPushTokenDirectory {
    async fn grouped_for_store(&self, store_id: Uuid) -> Result<GroupedTokens, NotificationError> {
        let rows = sqlx::query_as::<_, PushTokenRow>(
            "SELECT token, provider FROM push_tokens WHERE store_id = $1 AND is_active = TRUE",
        )
        .bind(store_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().collect())
    }
}

/// One push delivery service
#[async_trait]
pub trait PushProvider: Send + Sync {
    /// Provider name as stored next to each token
    fn name(&self) -> &'static str;
    async fn send(&self, tokens: &[String], message: &PushMessage) -> Result<(), NotificationError>;
}

/// Delivers one message to tokens of any provider
#[async_trait]
pub trait PushDispatcher: Send + Sync {
    async fn send_to_grouped_tokens(
        &self,
        tokens: &GroupedTokens,
        message: &PushMessage,
    ) -> Result<(), NotificationError>;
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

fn expo_messages(tokens: &[String], message: &PushMessage) -> Vec<serde_json::Value> {
    tokens
        .iter()
        .map(|token| {
            serde_json::json!({
                "to": token,
                "sound": "default",
                "title": message.title,
                "body": message.body,
                "data": message.data,
            })
        })
        .collect()
}

fn fcm_messages(tokens: &[String], message: &PushMessage) -> Vec<serde_json::Value> {
    tokens
        .iter()
        .map(|token| {
            serde_json::json!({
                "to": token,
                "notification": {
                    "title": message.title,
                    "body": message.body,
                    "sound": "default",
                },
                "data": message.data,
            })
        })
        .collect()
}

/// Expo push service
pub struct ExpoPushProvider {
    client: reqwest::Client,
    access_token: String,
    endpoint: String,
}

impl ExpoPushProvider {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            access_token: access_token.into(),
            endpoint: EXPO_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl PushProvider for ExpoPushProvider {
    fn name(&self) -> &'static str {
        "expo"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> Result<(), NotificationError> {
        if tokens.is_empty() {
            return Ok(());
        }

        self.client
            .post(&self.endpoint)
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&expo_messages(tokens, message))
            .send()
            .await?
            .error_for_status()?;

        tracing::info!("Sent {} Expo notifications", tokens.len());
        Ok(())
    }
}

/// Firebase Cloud Messaging, legacy HTTP API
pub struct FcmPushProvider {
    client: reqwest::Client,
    server_key: String,
    endpoint: String,
}

impl FcmPushProvider {
    pub fn new(server_key: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            server_key: server_key.into(),
            endpoint: FCM_ENDPOINT.to_string(),
        }
    }
}

#[async_trait]
impl PushProvider for FcmPushProvider {
    fn name(&self) -> &'static str {
        "fcm"
    }

    async fn send(&self, tokens: &[String], message: &PushMessage) -> Result<(), NotificationError> {
        if tokens.is_empty() {
            return Ok(());
        }

        for batch in tokens.chunks(FCM_BATCH_SIZE) {
            self.client
                .post(&self.endpoint)
                .header(reqwest::header::AUTHORIZATION, format!("key={}", self.server_key))
                .json(&fcm_messages(batch, message))
                .send()
                .await?
                .error_for_status()?;
        }

        tracing::info!("Sent {} FCM notifications", tokens.len());
        Ok(())
    }
}

/// Routes each token group to the provider registered under its name
#[derive(Clone, Default)]
pub struct MultiProviderDispatcher {
    providers: HashMap<&'static str, Arc<dyn PushProvider>>,
}

impl MultiProviderDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_provider(mut self, provider: Arc<dyn PushProvider>) -> Self {
        self.providers.insert(provider.name(), provider);
        self
    }

    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }
}

#[async_trait]
impl PushDispatcher for MultiProviderDispatcher {
    /// Every provider is attempted; the first failure is reported after all ran
    async fn send_to_grouped_tokens(
        &self,
        tokens: &GroupedTokens,
        message: &PushMessage,
    ) -> Result<(), NotificationError> {
        let mut first_error = None;

        for (provider_name, group) in tokens.iter() {
            if group.is_empty() {
                continue;
            }
            let Some(provider) = self.providers.get(provider_name) else {
                tracing::warn!(
                    "No push provider registered for '{}', skipping {} tokens",
                    provider_name,
                    group.len()
                );
                continue;
            };

            if let Err(e) = provider.send(group, message).await {
                tracing::warn!("Push via {} failed: {}", provider_name, e);
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
