use chrono::Utc;
use log::{debug, trace};
use sqlx::SqliteConnection;
use uuid::Uuid;

use crate::{
    db_types::{ImportData, ImportRecord, NewImportRecord},
    traits::ImportApiError,
};

pub async fn insert_import_record(
    record: NewImportRecord,
    conn: &mut SqliteConnection,
) -> Result<ImportRecord, ImportApiError> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();
    let record: ImportRecord = sqlx::query_as(
        r#"
            INSERT INTO import_records (id, data, profile_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING *;
        "#,
    )
    .bind(&id)
    .bind(serde_json::to_string(&record.data)?)
    .bind(record.profile_id)
    .bind(now)
    .fetch_all(conn)
    .await?
    .pop()
    .ok_or(sqlx::Error::RowNotFound)?;
    trace!("🗃️ Import record {id} inserted");
    Ok(record)
}

/// Returns all import records in insertion order.
pub async fn fetch_import_records(conn: &mut SqliteConnection) -> Result<Vec<ImportRecord>, sqlx::Error> {
    let records = sqlx::query_as("SELECT * FROM import_records ORDER BY created_at ASC, rowid ASC").fetch_all(conn).await?;
    Ok(records)
}

pub async fn fetch_import_record(id: &str, conn: &mut SqliteConnection) -> Result<Option<ImportRecord>, sqlx::Error> {
    let record = sqlx::query_as("SELECT * FROM import_records WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(record)
}

pub async fn update_import_record(
    id: &str,
    data: ImportData,
    profile_id: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<Option<ImportRecord>, ImportApiError> {
    let record = sqlx::query_as(
        r#"
            UPDATE import_records SET data = $1, profile_id = $2, updated_at = $3
            WHERE id = $4
            RETURNING *;
        "#,
    )
    .bind(serde_json::to_string(&data)?)
    .bind(profile_id)
    .bind(Utc::now())
    .bind(id)
    .fetch_all(conn)
    .await?
    .pop();
    Ok(record)
}

pub async fn delete_import_record(id: &str, conn: &mut SqliteConnection) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM import_records WHERE id = $1").bind(id).execute(conn).await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete_all_import_records(conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM import_records").execute(conn).await?;
    debug!("🗃️ {} import records deleted", result.rows_affected());
    Ok(result.rows_affected())
}
