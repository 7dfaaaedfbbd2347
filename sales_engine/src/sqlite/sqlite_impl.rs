//! `SqliteDatabase` is the SQLite implementation of the sales engine backend traits.
use std::fmt::Debug;

use log::*;
use sales_common::{DateRange, Secret};
use sqlx::{migrate, SqlitePool};

use super::db::{integrations, new_pool, niches, orders, orders::OrderQuery, SqliteDatabaseError};
use crate::{
    db_types::{IntegrationCredential, NewOrderRecord, OrderId, OrderRecord},
    traits::{IntegrationStore, NicheStore, OrderStore, SalesDatabase, StoreError, UpsertSummary},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        trace!("🗃️ Created Sqlite pool for {url}");
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    pub async fn close(&mut self) -> Result<(), SqliteDatabaseError> {
        self.pool.close().await;
        Ok(())
    }

    pub async fn count_orders(&self, user_id: i64) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::count_orders(user_id, &mut conn).await?)
    }
}

impl OrderStore for SqliteDatabase {
    async fn upsert_orders(&self, user_id: i64, records: &[NewOrderRecord]) -> Result<UpsertSummary, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut summary = UpsertSummary::default();
        for record in records {
            match orders::upsert_order(user_id, record, &mut tx).await {
                Ok(()) => summary.written += 1,
                Err(e) => {
                    warn!("🗃️ Order {} for user #{user_id} was skipped. {e}", record.order_id);
                    summary.skipped += 1;
                },
            }
        }
        tx.commit().await?;
        debug!("🗃️ Upserted {} orders for user #{user_id} ({} skipped)", summary.written, summary.skipped);
        Ok(summary)
    }

    async fn fetch_orders(&self, user_id: i64, range: &DateRange) -> Result<Vec<OrderRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let query = OrderQuery::for_user(user_id).between(range.start(), range.end());
        Ok(orders::fetch_orders(query, &mut conn).await?)
    }

    async fn fetch_order(&self, user_id: i64, order_id: &OrderId) -> Result<Option<OrderRecord>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(orders::fetch_order(user_id, order_id, &mut conn).await?)
    }
}

impl NicheStore for SqliteDatabase {
    async fn get_niche(&self, user_id: i64, sku: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        Ok(niches::fetch_niche(user_id, sku, &mut conn).await?)
    }

    async fn assign_niche(&self, user_id: i64, sku: &str, niche: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        niches::upsert_niche(user_id, sku, niche, &mut conn).await?;
        debug!("🗃️ SKU {sku} of user #{user_id} is now in niche '{niche}'");
        Ok(())
    }
}

impl IntegrationStore for SqliteDatabase {
    async fn get_credential(&self, user_id: i64, provider: &str) -> Result<Option<Secret<String>>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let integration = integrations::fetch_integration(user_id, provider, &mut conn).await?;
        Ok(integration.map(|i| IntegrationCredential::from(i).token).filter(|t| !t.is_blank()))
    }

    async fn list_users_with_integration(&self, provider: &str) -> Result<Vec<IntegrationCredential>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        let rows = integrations::fetch_integrations_for_provider(provider, &mut conn).await?;
        Ok(rows.into_iter().map(IntegrationCredential::from).collect())
    }

    async fn save_integration(&self, user_id: i64, provider: &str, token: &Secret<String>) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        integrations::upsert_integration(user_id, provider, token, &mut conn).await?;
        info!("🗃️ Saved {provider} integration for user #{user_id}");
        Ok(())
    }
}

impl SalesDatabase for SqliteDatabase {}
