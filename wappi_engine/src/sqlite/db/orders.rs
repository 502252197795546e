use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    db_types::{ClaimToken, NewOrder, Order, OrderData, OrderId, OrderStatusType, OrderUpdate},
    traits::OrderApiError,
};

/// Inserts a new order in the initial status using the given connection. This is not atomic. You can embed this call
/// inside a transaction if you need to ensure atomicity, and pass `&mut *tx` as the connection argument.
pub async fn insert_order(order: NewOrder, conn: &mut SqliteConnection) -> Result<Order, OrderApiError> {
    let data = serde_json::to_string(&OrderData { items: order.items })?;
    let now = Utc::now();
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                id,
                profile_id,
                user_id,
                status,
                status_message,
                eta,
                data,
                delivery_fee,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            RETURNING *;
        "#,
    )
    .bind(order.id.as_str())
    .bind(order.profile_id)
    .bind(order.user_id)
    .bind(OrderStatusType::initial().as_str())
    .bind(order.status_message)
    .bind(order.eta)
    .bind(data)
    .bind(order.delivery_fee)
    .bind(now)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    debug!("🗃️ Order {} inserted", order.id);
    Ok(order)
}

pub async fn fetch_order(id: &OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id.as_str()).fetch_optional(conn).await?;
    Ok(order)
}

/// Fetches all orders, newest first.
pub async fn fetch_orders(conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC, rowid DESC").fetch_all(conn).await?;
    Ok(orders)
}

pub async fn fetch_orders_for_user(user_id: &str, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let orders = sqlx::query_as("SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, rowid DESC")
        .bind(user_id)
        .fetch_all(conn)
        .await?;
    Ok(orders)
}

/// Applies the fields that are set in `update`. When nothing is set, the order is returned unchanged.
pub async fn update_order(
    id: &OrderId,
    update: OrderUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, OrderApiError> {
    if update.is_empty() {
        trace!("🗃️ Empty update for order {id}. Nothing to do");
        return Ok(fetch_order(id, conn).await?);
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE orders SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(status) = update.status {
        set_clause.push("status = ");
        set_clause.push_bind_unseparated(status.as_str());
    }
    if let Some(message) = update.status_message {
        set_clause.push("status_message = ");
        set_clause.push_bind_unseparated(message);
    }
    if let Some(eta) = update.eta {
        set_clause.push("eta = ");
        set_clause.push_bind_unseparated(eta);
    }
    if let Some(items) = update.items {
        set_clause.push("data = ");
        set_clause.push_bind_unseparated(serde_json::to_string(&OrderData { items })?);
    }
    set_clause.push("updated_at = ");
    set_clause.push_bind_unseparated(Utc::now());
    builder.push(" WHERE id = ");
    builder.push_bind(id.as_str());
    builder.push(" RETURNING *;");
    trace!("🗃️ Executing query: {}", builder.sql());
    let order = builder.build_query_as::<Order>().fetch_all(conn).await?.pop();
    Ok(order)
}

pub async fn update_order_status(
    id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    let order = sqlx::query_as("UPDATE orders SET status = $1, updated_at = $2 WHERE id = $3 RETURNING *;")
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.as_str())
        .fetch_all(conn)
        .await?
        .pop();
    Ok(order)
}

/// Sets `user_id` on the order if nobody has claimed it yet. Returns `true` if the row was updated.
pub async fn assign_user(id: &OrderId, user_id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE orders SET user_id = $1, updated_at = $2 WHERE id = $3 AND user_id IS NULL")
        .bind(user_id)
        .bind(Utc::now())
        .bind(id.as_str())
        .execute(conn)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn insert_claim_token(
    token: &str,
    order_id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<ClaimToken, sqlx::Error> {
    let token = sqlx::query_as(
        "INSERT INTO claim_tokens (token, order_id, created_at) VALUES ($1, $2, $3) RETURNING token, order_id, \
         created_at;",
    )
    .bind(token)
    .bind(order_id.as_str())
    .bind(Utc::now())
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    Ok(token)
}

pub async fn fetch_claim_token(token: &str, conn: &mut SqliteConnection) -> Result<Option<ClaimToken>, sqlx::Error> {
    let token = sqlx::query_as("SELECT token, order_id, created_at FROM claim_tokens WHERE token = $1")
        .bind(token)
        .fetch_optional(conn)
        .await?;
    Ok(token)
}
