use chrono::Utc;
use log::trace;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::db_types::{Settings, SettingsUpdate};

pub async fn fetch_settings(conn: &mut SqliteConnection) -> Result<Option<Settings>, sqlx::Error> {
    let settings = sqlx::query_as("SELECT * FROM settings WHERE id = 1").fetch_optional(conn).await?;
    Ok(settings)
}

/// Writes the provided fields. The settings row is created from its column defaults if it does not exist yet.
pub async fn update_settings(
    update: SettingsUpdate,
    conn: &mut SqliteConnection,
) -> Result<Option<Settings>, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO settings (id) VALUES (1)").execute(&mut *conn).await?;
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE settings SET ");
    let mut set_clause = builder.separated(", ");
    if let Some(name) = update.business_name {
        set_clause.push("business_name = ");
        set_clause.push_bind_unseparated(name);
    }
    if let Some(location) = update.business_location {
        set_clause.push("business_lat = ");
        set_clause.push_bind_unseparated(location.latitude);
        set_clause.push("business_long = ");
        set_clause.push_bind_unseparated(location.longitude);
    }
    if let Some(location) = update.default_map_location {
        set_clause.push("default_map_lat = ");
        set_clause.push_bind_unseparated(location.latitude);
        set_clause.push("default_map_long = ");
        set_clause.push_bind_unseparated(location.longitude);
    }
    if let Some(zoom) = update.default_map_zoom {
        set_clause.push("default_map_zoom = ");
        set_clause.push_bind_unseparated(zoom);
    }
    if let Some(weight) = update.default_item_weight {
        set_clause.push("default_item_weight = ");
        set_clause.push_bind_unseparated(weight);
    }
    if let Some(price) = update.delivery_base_price {
        set_clause.push("delivery_base_price = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(price) = update.delivery_price_per_km {
        set_clause.push("delivery_price_per_km = ");
        set_clause.push_bind_unseparated(price);
    }
    if let Some(price) = update.delivery_price_per_kg {
        set_clause.push("delivery_price_per_kg = ");
        set_clause.push_bind_unseparated(price);
    }
    set_clause.push("updated_at = ");
    set_clause.push_bind_unseparated(Utc::now());
    builder.push(" WHERE id = 1 RETURNING *;");
    trace!("🗃️ Executing query: {}", builder.sql());
    let settings = builder.build_query_as::<Settings>().fetch_all(conn).await?.pop();
    Ok(settings)
}
