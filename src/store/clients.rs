use sqlx::{SqliteConnection, SqlitePool};
use tracing::{info, instrument, warn};

use crate::{
    error::{StoreError, StoreResult},
    model::{Client, NewClient},
    utils::db_utils::now,
};

const CLIENT_COLUMNS: &str = "id, name, address, latitude, longitude, created_at";

pub(crate) async fn fetch_client(
    conn: &mut SqliteConnection,
    id: i64,
) -> StoreResult<Option<Client>> {
    let client = sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(client)
}

#[instrument(skip(pool, new_client), fields(name = %new_client.name))]
pub async fn create_client(pool: &SqlitePool, new_client: NewClient) -> StoreResult<Client> {
    let client = sqlx::query_as::<_, Client>(&format!(
        r#"
        INSERT INTO clients (name, address, latitude, longitude, created_at)
        VALUES (?, ?, ?, ?, ?)
        RETURNING {CLIENT_COLUMNS}
        "#
    ))
    .bind(&new_client.name)
    .bind(&new_client.address)
    .bind(new_client.latitude)
    .bind(new_client.longitude)
    .bind(now())
    .fetch_one(pool)
    .await?;

    info!(client_id = client.id, "Client created");
    Ok(client)
}

pub async fn get_client(pool: &SqlitePool, id: i64) -> StoreResult<Client> {
    let mut conn = pool.acquire().await?;

    fetch_client(&mut conn, id)
        .await?
        .ok_or_else(|| StoreError::not_found("client", id))
}

pub async fn list_clients(pool: &SqlitePool) -> StoreResult<Vec<Client>> {
    let clients = sqlx::query_as::<_, Client>(&format!(
        "SELECT {CLIENT_COLUMNS} FROM clients ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

/// Deletes a client nobody is assigned to and nobody has checked in at.
#[instrument(skip(pool))]
pub async fn delete_client(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM clients WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from);

    match deleted {
        Ok(result) if result.rows_affected() == 0 => Err(StoreError::not_found("client", id)),
        Ok(_) => {
            tx.commit().await?;
            info!(client_id = id, "Client deleted");
            Ok(())
        }
        Err(StoreError::InvalidReference(_)) => {
            warn!(client_id = id, "Delete blocked by assignments or checkins");
            Err(StoreError::InvalidState(format!(
                "client {id} still has assignments or checkins"
            )))
        }
        Err(e) => Err(e),
    }
}
