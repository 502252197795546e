use thiserror::Error;

use crate::db_types::{ClaimToken, NewOrder, Order, OrderId, OrderStatusType, OrderUpdate};

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Stored order data is corrupt: {0}")]
    CorruptData(String),
}

impl From<sqlx::Error> for OrderApiError {
    fn from(e: sqlx::Error) -> Self {
        OrderApiError::DatabaseError(e.to_string())
    }
}

impl From<serde_json::Error> for OrderApiError {
    fn from(e: serde_json::Error) -> Self {
        OrderApiError::CorruptData(e.to_string())
    }
}

/// Storage for orders and their claim tokens.
#[allow(async_fn_in_trait)]
pub trait OrderManagement {
    /// Stores a new order in the initial status.
    async fn insert_order(&self, order: NewOrder) -> Result<Order, OrderApiError>;

    async fn fetch_order(&self, id: &OrderId) -> Result<Option<Order>, OrderApiError>;

    /// Applies the `Some` fields of `update`. Returns `None` if the order does not exist.
    async fn update_order(&self, id: &OrderId, update: OrderUpdate) -> Result<Option<Order>, OrderApiError>;

    /// Returns `None` if the order does not exist.
    async fn update_order_status(
        &self,
        id: &OrderId,
        status: OrderStatusType,
    ) -> Result<Option<Order>, OrderApiError>;

    /// Every order, newest first.
    async fn fetch_orders(&self) -> Result<Vec<Order>, OrderApiError>;

    /// The orders claimed by `user_id`, newest first.
    async fn fetch_orders_for_user(&self, user_id: &str) -> Result<Vec<Order>, OrderApiError>;

    async fn insert_claim_token(&self, token: &str, order_id: &OrderId) -> Result<ClaimToken, OrderApiError>;

    async fn fetch_claim_token(&self, token: &str) -> Result<Option<ClaimToken>, OrderApiError>;

    /// Sets the order's user if, and only if, the order is unclaimed. Returns `true` when this call claimed the order.
    async fn assign_user(&self, id: &OrderId, user_id: &str) -> Result<bool, OrderApiError>;
}
