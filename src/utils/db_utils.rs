use chrono::{NaiveDateTime, Utc};
use sqlx::SqliteConnection;

use crate::error::{StoreError, StoreResult};

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Current UTC time in the same shape as sqlite's `CURRENT_TIMESTAMP`.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
pub fn build_update_sql(
    table: &str,
    columns: Vec<(&str, SqlValue)>,
    id_column: &str,
    id_value: i64,
) -> StoreResult<SqlUpdate> {
    if columns.is_empty() {
        return Err(StoreError::InvalidState(format!(
            "no fields provided for {table} update"
        )));
    }

    let set_clause = columns
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values: Vec<SqlValue> = columns.into_iter().map(|(_, value)| value).collect();

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(
    conn: &mut SqliteConnection,
    update: SqlUpdate,
) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<i64>),
        };
    }

    let result = query.execute(conn).await?;
    Ok(result.rows_affected())
}

/// True when `table` has a row with the given id. `table` is never user input.
pub async fn row_exists(
    conn: &mut SqliteConnection,
    table: &'static str,
    id: i64,
) -> Result<bool, sqlx::Error> {
    let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = ? LIMIT 1)", table);

    sqlx::query_scalar::<_, bool>(&sql)
        .bind(id)
        .fetch_one(conn)
        .await
}

/// Turns a failed write into a typed error, naming the first missing row
/// when the failure was a foreign key violation.
///
/// `references` lists `(table, label, id)` for every row the write pointed at.
pub async fn explain_write_error(
    conn: &mut SqliteConnection,
    err: sqlx::Error,
    references: &[(&'static str, &'static str, i64)],
) -> StoreError {
    let err = StoreError::from(err);
    if !matches!(err, StoreError::InvalidReference(_)) {
        return err;
    }

    for &(table, label, id) in references {
        match row_exists(conn, table, id).await {
            Ok(true) => continue,
            Ok(false) => {
                return StoreError::InvalidReference(format!("{label} {id} does not exist"));
            }
            Err(e) => return StoreError::from(e),
        }
    }

    err
}

/// Number of rows in `table` whose `column` equals `id`.
pub async fn count_references(
    conn: &mut SqliteConnection,
    table: &'static str,
    column: &'static str,
    id: i64,
) -> Result<i64, sqlx::Error> {
    let sql = format!("SELECT COUNT(*) FROM {} WHERE {} = ?", table, column);

    sqlx::query_scalar::<_, i64>(&sql)
        .bind(id)
        .fetch_one(conn)
        .await
}
