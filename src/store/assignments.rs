use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{info, instrument, warn};

use crate::{
    error::StoreResult,
    model::{AssignedClient, Assignment},
    utils::db_utils::explain_write_error,
};

/// Links an employee to a client. Repeated pairs are stored as separate rows.
#[instrument(skip(pool))]
pub async fn assign_employee(
    pool: &SqlitePool,
    employee_id: i64,
    client_id: i64,
    assigned_date: NaiveDate,
) -> StoreResult<Assignment> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, Assignment>(
        r#"
        INSERT INTO employee_clients (employee_id, client_id, assigned_date)
        VALUES (?, ?, ?)
        RETURNING id, employee_id, client_id, assigned_date
        "#,
    )
    .bind(employee_id)
    .bind(client_id)
    .bind(assigned_date)
    .fetch_one(&mut *tx)
    .await;

    let assignment = match inserted {
        Ok(assignment) => assignment,
        Err(e) => {
            let err = explain_write_error(
                &mut tx,
                e,
                &[("users", "employee", employee_id), ("clients", "client", client_id)],
            )
            .await;
            warn!(error = %err, "Assignment rejected");
            return Err(err);
        }
    };

    tx.commit().await?;

    info!(assignment_id = assignment.id, "Employee assigned to client");
    Ok(assignment)
}

pub async fn list_assigned_clients(
    pool: &SqlitePool,
    employee_id: i64,
) -> StoreResult<Vec<AssignedClient>> {
    let clients = sqlx::query_as::<_, AssignedClient>(
        r#"
        SELECT
            ec.id AS assignment_id,
            c.id AS client_id,
            c.name,
            c.address,
            c.latitude,
            c.longitude,
            ec.assigned_date
        FROM employee_clients ec
        INNER JOIN clients c ON c.id = ec.client_id
        WHERE ec.employee_id = ?
        ORDER BY c.name, ec.assigned_date, ec.id
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(clients)
}

pub async fn is_assigned(pool: &SqlitePool, employee_id: i64, client_id: i64) -> StoreResult<bool> {
    let assigned = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM employee_clients
            WHERE employee_id = ? AND client_id = ?
            LIMIT 1
        )
        "#,
    )
    .bind(employee_id)
    .bind(client_id)
    .fetch_one(pool)
    .await?;

    Ok(assigned)
}
