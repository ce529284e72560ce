// Store directory
//
// Tenants are created and edited elsewhere; the order core only needs to find
// a store by its owner or by its public subdomain.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::orders::error::OrderError;
use crate::plans::Plan;

/// A tenant
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Store {
    pub id: Uuid,
    pub name: String,
    pub subdomain: String,
    pub user_id: Uuid,
    /// Subscription plan tag as written by billing
    pub plan: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Store {
    pub fn plan(&self) -> Plan {
        Plan::parse(&self.plan)
    }
}

#[async_trait]
pub trait StoreDirectory: Send + Sync {
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Store>, OrderError>;
    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Store>, OrderError>;
}

/// Postgres-backed store lookups
#[derive(Clone)]
pub struct PgStoreDirectory {
    pool: PgPool,
}

impl PgStoreDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreDirectory for PgStoreDirectory {
    async fn find_by_owner(&self, user_id: Uuid) -> Result<Option<Store>, OrderError> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, subdomain, user_id, plan, created_at, updated_at
            FROM stores
            WHERE user_id = $1
            LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }

    async fn find_by_subdomain(&self, subdomain: &str) -> Result<Option<Store>, OrderError> {
        let store = sqlx::query_as::<_, Store>(
            r#"
            SELECT id, name, subdomain, user_id, plan, created_at, updated_at
            FROM stores
            WHERE subdomain = $1
            "#,
        )
        .bind(subdomain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(store)
    }
}
