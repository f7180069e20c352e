use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use super::{db_url, media, new_pool, orders, roles, settings, SqliteDatabaseError};
use crate::{
    db::traits::{
        InsertOrderResult,
        MediaManagement,
        OrderManagement,
        PaymentGatewayDatabase,
        RoleManagement,
        SettingsManagement,
        StorageError,
    },
    db_types::{
        MediaRecord,
        NewMediaRecord,
        NewOrder,
        Order,
        OrderId,
        OrderStatusType,
        PaymentSettings,
        Role,
        StoredPaymentSettings,
    },
    AuthApiError,
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({})", self.url)
    }
}

impl SqliteDatabase {
    /// Creates a new database API object using the `RPG_DATABASE_URL` environment variable (or its default).
    pub async fn new(max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let url = db_url();
        SqliteDatabase::new_with_url(&url, max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        let pool = new_pool(url, max_connections).await?;
        Ok(Self { url: url.to_string(), pool })
    }

    /// Brings the schema up to date. Safe to call on every start-up.
    pub async fn run_migrations(&self) -> Result<(), SqliteDatabaseError> {
        sqlx::migrate!("./src/db/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations are up to date");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl OrderManagement for SqliteDatabase {
    async fn fetch_order_by_order_id(&self, order_id: &OrderId) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_order_by_order_id(order_id, &mut conn).await?)
    }

    async fn fetch_order_by_resource_path(&self, resource_path: &str) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_order_by_resource_path(resource_path, &mut conn).await?)
    }

    async fn fetch_orders_by_status(&self, statuses: &[OrderStatusType]) -> Result<Vec<Order>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::fetch_orders_by_status(statuses, &mut conn).await?)
    }
}

impl PaymentGatewayDatabase for SqliteDatabase {
    fn url(&self) -> &str {
        self.url.as_str()
    }

    async fn insert_order(&self, order: NewOrder) -> Result<InsertOrderResult, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::insert_order(order, &mut conn).await?)
    }

    async fn attach_gateway_session(
        &self,
        order_id: &OrderId,
        resource_path: &str,
    ) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::attach_gateway_session(order_id, resource_path, &mut conn).await?)
    }

    async fn transition_order_status(
        &self,
        order_id: &OrderId,
        from: &[OrderStatusType],
        to: OrderStatusType,
    ) -> Result<Option<Order>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(orders::transition_order_status(order_id, from, to, &mut conn).await?)
    }

    async fn close(&mut self) -> Result<(), StorageError> {
        self.pool.close().await;
        Ok(())
    }
}

impl RoleManagement for SqliteDatabase {
    async fn fetch_roles_for_user(&self, user_id: &str) -> Result<Vec<Role>, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        roles::roles_for_user(user_id, &mut conn).await
    }

    async fn check_user_has_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        roles::user_has_roles(user_id, roles, &mut conn).await
    }

    async fn assign_roles(&self, user_id: &str, roles: &[Role]) -> Result<(), AuthApiError> {
        let mut tx = self.pool.begin().await.map_err(SqliteDatabaseError::from)?;
        roles::assign_roles(user_id, roles, &mut tx).await?;
        tx.commit().await.map_err(SqliteDatabaseError::from)?;
        Ok(())
    }

    async fn remove_roles(&self, user_id: &str, roles: &[Role]) -> Result<u64, AuthApiError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        roles::remove_roles(user_id, roles, &mut conn).await
    }
}

impl SettingsManagement for SqliteDatabase {
    async fn fetch_payment_settings(&self) -> Result<Option<StoredPaymentSettings>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(settings::fetch_payment_settings(&mut conn).await?)
    }

    async fn upsert_payment_settings(&self, settings: &PaymentSettings) -> Result<StoredPaymentSettings, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(settings::upsert_payment_settings(settings, &mut conn).await?)
    }
}

impl MediaManagement for SqliteDatabase {
    async fn insert_media_record(&self, record: &NewMediaRecord, created_by: &str) -> Result<MediaRecord, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(media::insert_media_record(record, created_by, &mut conn).await?)
    }

    async fn fetch_media_records(&self) -> Result<Vec<MediaRecord>, StorageError> {
        let mut conn = self.pool.acquire().await.map_err(SqliteDatabaseError::from)?;
        Ok(media::fetch_media_records(&mut conn).await?)
    }
}
