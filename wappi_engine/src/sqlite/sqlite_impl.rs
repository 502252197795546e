//! `SqliteDatabase` is the concrete storage backend of the Wappi engine.
//!
//! Unsurprisingly, it uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::db::{db_url, imports, new_pool, orders, settings};
use crate::{
    db_types::{
        ClaimToken,
        ImportData,
        ImportRecord,
        NewImportRecord,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        OrderUpdate,
        Settings,
        SettingsUpdate,
    },
    traits::{
        ImportApiError,
        ImportManagement,
        OrderApiError,
        OrderManagement,
        SettingsApiError,
        SettingsManagement,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl ImportManagement for SqliteDatabase {
    async fn insert_import_record(&self, record: NewImportRecord) -> Result<ImportRecord, ImportApiError> {
        let mut conn = self.pool.acquire().await?;
        let record = imports::insert_import_record(record, &mut conn).await?;
        Ok(record)
    }

    async fn fetch_import_records(&self) -> Result<Vec<ImportRecord>, ImportApiError> {
        let mut conn = self.pool.acquire().await?;
        let records = imports::fetch_import_records(&mut conn).await?;
        trace!("🗃️ Fetched {} import records", records.len());
        Ok(records)
    }

    async fn fetch_import_record(&self, id: &str) -> Result<Option<ImportRecord>, ImportApiError> {
        let mut conn = self.pool.acquire().await?;
        let record = imports::fetch_import_record(id, &mut conn).await?;
        Ok(record)
    }

    async fn update_import_record(
        &self,
        id: &str,
        data: ImportData,
        profile_id: Option<String>,
    ) -> Result<Option<ImportRecord>, ImportApiError> {
        let mut conn = self.pool.acquire().await?;
        let record = imports::update_import_record(id, data, profile_id, &mut conn).await?;
        Ok(record)
    }

    async fn delete_import_record(&self, id: &str) -> Result<bool, ImportApiError> {
        let mut conn = self.pool.acquire().await?;
        let deleted = imports::delete_import_record(id, &mut conn).await?;
        Ok(deleted)
    }

    async fn delete_all_import_records(&self) -> Result<u64, ImportApiError> {
        let mut conn = self.pool.acquire().await?;
        let count = imports::delete_all_import_records(&mut conn).await?;
        Ok(count)
    }
}

impl OrderManagement for SqliteDatabase {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(order, &mut conn).await
    }

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::fetch_order(id, &mut conn).await?;
        Ok(order)
    }

    async fn update_order(&self, id: &OrderId, update: OrderUpdate) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        orders::update_order(id, update, &mut conn).await
    }

    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Option<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let order = orders::update_order_status(id, status, &mut conn).await?;
        Ok(order)
    }

    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders(&mut conn).await?;
        Ok(orders)
    }

    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let orders = orders::fetch_orders_for_user(user_id, &mut conn).await?;
        Ok(orders)
    }

    async fn insert_claim_token(&self, token: &str, order_id: &OrderId) -> Result<ClaimToken, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let token = orders::insert_claim_token(token, order_id, &mut conn).await?;
        Ok(token)
    }

    async fn fetch_claim_token(&self, token: &str) -> Result<Option<ClaimToken>, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let token = orders::fetch_claim_token(token, &mut conn).await?;
        Ok(token)
    }

    async fn assign_user(&self, id: &OrderId, user_id: &str) -> Result<bool, OrderApiError> {
        let mut conn = self.pool.acquire().await?;
        let claimed = orders::assign_user(id, user_id, &mut conn).await?;
        Ok(claimed)
    }
}

impl SettingsManagement for SqliteDatabase {
    async fn fetch_settings(&self) -> Result<Settings, SettingsApiError> {
        let mut conn = self.pool.acquire().await?;
        settings::fetch_settings(&mut conn).await?.ok_or(SettingsApiError::SettingsNotFound)
    }

    async fn update_settings(&self, update: SettingsUpdate) -> Result<Settings, SettingsApiError> {
        let mut tx = self.pool.begin().await?;
        let settings = settings::update_settings(update, &mut tx).await?.ok_or(SettingsApiError::SettingsNotFound)?;
        tx.commit().await?;
        debug!("🗃️ Settings updated");
        Ok(settings)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }
}
