use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, instrument, warn};

use crate::{
    error::{StoreError, StoreResult},
    model::{DailySummary, EmployeeDaySummary, Role, TeamSummary},
    utils::db_utils::round2,
};

/// Team activity for one day, for the manager's dashboard.
///
/// Hours only count completed checkins. `employee_id` narrows both the
/// breakdown and the team totals to a single team member.
#[instrument(skip(pool))]
pub async fn daily_summary(
    pool: &SqlitePool,
    manager_id: i64,
    date: NaiveDate,
    employee_id: Option<i64>,
) -> StoreResult<DailySummary> {
    let mut tx = pool.begin().await?;

    let role = sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = ?")
        .bind(manager_id)
        .fetch_optional(&mut *tx)
        .await?;

    match role {
        None => return Err(StoreError::not_found("user", manager_id)),
        Some(Role::Manager) => {}
        Some(_) => {
            warn!("Daily summary requested for a non-manager");
            return Err(StoreError::InvalidReference(format!(
                "user {manager_id} is not a manager"
            )));
        }
    }

    let mut employee_breakdown = sqlx::query_as::<_, EmployeeDaySummary>(
        r#"
        SELECT
            u.id AS employee_id,
            u.name AS employee_name,
            u.email AS employee_email,
            COUNT(ch.id) AS checkins,
            COUNT(DISTINCT ch.client_id) AS clients_visited,
            TOTAL(
                CASE
                    WHEN ch.checkout_time IS NOT NULL
                    THEN (julianday(ch.checkout_time) - julianday(ch.checkin_time)) * 24
                    ELSE 0.0
                END
            ) AS total_hours,
            AVG(ch.distance_from_client) AS avg_distance_km
        FROM users u
        LEFT JOIN checkins ch ON u.id = ch.employee_id
            AND DATE(ch.checkin_time) = ?
        WHERE u.manager_id = ?
        AND (? IS NULL OR u.id = ?)
        GROUP BY u.id, u.name, u.email
        ORDER BY u.name, u.id
        "#,
    )
    .bind(date)
    .bind(manager_id)
    .bind(employee_id)
    .bind(employee_id)
    .fetch_all(&mut *tx)
    .await?;

    let unique_clients = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT ch.client_id)
        FROM checkins ch
        INNER JOIN users u ON ch.employee_id = u.id
        WHERE u.manager_id = ?
        AND DATE(ch.checkin_time) = ?
        AND (? IS NULL OR ch.employee_id = ?)
        "#,
    )
    .bind(manager_id)
    .bind(date)
    .bind(employee_id)
    .bind(employee_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    let mut team_summary = TeamSummary {
        unique_clients,
        ..TeamSummary::default()
    };

    for row in &mut employee_breakdown {
        row.total_hours = round2(row.total_hours);
        row.avg_distance_km = row.avg_distance_km.map(round2);

        team_summary.total_checkins += row.checkins;
        team_summary.total_hours += row.total_hours;
        if row.checkins > 0 {
            team_summary.employees_active += 1;
        }
    }
    team_summary.total_hours = round2(team_summary.total_hours);

    debug!(
        members = employee_breakdown.len(),
        total_checkins = team_summary.total_checkins,
        "Daily summary built"
    );

    Ok(DailySummary {
        date,
        team_summary,
        employee_breakdown,
    })
}
