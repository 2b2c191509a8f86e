use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{StoreError, StoreResult},
    geofence::{Coordinates, DistanceCalculator},
    model::{Checkin, CheckinStatus, DateRange, NewCheckin},
    store::clients::fetch_client,
    utils::db_utils::{explain_write_error, now},
};

const CHECKIN_COLUMNS: &str = "id, employee_id, client_id, checkin_time, checkout_time, \
     latitude, longitude, distance_from_client, notes, status";

async fn fetch_checkin(conn: &mut SqliteConnection, id: i64) -> StoreResult<Option<Checkin>> {
    let checkin = sqlx::query_as::<_, Checkin>(&format!(
        "SELECT {CHECKIN_COLUMNS} FROM checkins WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(checkin)
}

/// Opens a checkin at the current time.
#[instrument(
    skip(pool, new_checkin),
    fields(employee_id = new_checkin.employee_id, client_id = new_checkin.client_id)
)]
pub async fn check_in(pool: &SqlitePool, new_checkin: NewCheckin) -> StoreResult<Checkin> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, Checkin>(&format!(
        r#"
        INSERT INTO checkins
            (employee_id, client_id, checkin_time, latitude, longitude, notes, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {CHECKIN_COLUMNS}
        "#
    ))
    .bind(new_checkin.employee_id)
    .bind(new_checkin.client_id)
    .bind(now())
    .bind(new_checkin.latitude)
    .bind(new_checkin.longitude)
    .bind(&new_checkin.notes)
    .bind(CheckinStatus::CheckedIn)
    .fetch_one(&mut *tx)
    .await;

    let checkin = match inserted {
        Ok(checkin) => checkin,
        Err(e) => {
            let err = explain_write_error(
                &mut tx,
                e,
                &[
                    ("users", "employee", new_checkin.employee_id),
                    ("clients", "client", new_checkin.client_id),
                ],
            )
            .await;
            warn!(error = %err, "Check-in rejected");
            return Err(err);
        }
    };

    tx.commit().await?;

    info!(checkin_id = checkin.id, "Checked in");
    Ok(checkin)
}

/// Closes an open checkin and records how far from the site it ended.
///
/// The distance is measured from the checkout position when both coordinates
/// are given, otherwise from the check-in position. Clients without a known
/// location leave `distance_from_client` empty.
#[instrument(skip(pool, calculator))]
pub async fn check_out(
    pool: &SqlitePool,
    calculator: &dyn DistanceCalculator,
    checkin_id: i64,
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> StoreResult<Checkin> {
    let mut tx = pool.begin().await?;

    // Write before reading: a concurrent checkout of the same row blocks on
    // this update and then matches nothing.
    let result = sqlx::query(
        r#"
        UPDATE checkins
        SET checkout_time = MAX(?, checkin_time), status = ?
        WHERE id = ?
        AND status = ?
        "#,
    )
    .bind(now())
    .bind(CheckinStatus::CheckedOut)
    .bind(checkin_id)
    .bind(CheckinStatus::CheckedIn)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        if fetch_checkin(&mut tx, checkin_id).await?.is_none() {
            return Err(StoreError::not_found("checkin", checkin_id));
        }
        warn!("Checkin already closed");
        return Err(StoreError::InvalidState(format!(
            "checkin {checkin_id} is already checked out"
        )));
    }

    let closed = fetch_checkin(&mut tx, checkin_id)
        .await?
        .ok_or_else(|| StoreError::not_found("checkin", checkin_id))?;

    let site = fetch_client(&mut tx, closed.client_id)
        .await?
        .and_then(|client| client.location());
    let position = Coordinates::from_parts(latitude, longitude).or_else(|| closed.position());

    let distance = match (position, site) {
        (Some(position), Some(site)) => {
            let distance = calculator.distance_km(position, site);
            if !distance.is_finite() {
                warn!(distance, "Discarding non-finite distance");
            }
            Some(distance).filter(|d| d.is_finite())
        }
        _ => None,
    };

    let checkin = match distance {
        Some(distance) => {
            sqlx::query("UPDATE checkins SET distance_from_client = ? WHERE id = ?")
                .bind(distance)
                .bind(checkin_id)
                .execute(&mut *tx)
                .await?;

            Checkin {
                distance_from_client: Some(distance),
                ..closed
            }
        }
        None => closed,
    };

    tx.commit().await?;

    info!(distance_km = ?checkin.distance_from_client, "Checked out");
    Ok(checkin)
}

pub async fn get_checkin(pool: &SqlitePool, id: i64) -> StoreResult<Checkin> {
    let mut conn = pool.acquire().await?;

    fetch_checkin(&mut conn, id)
        .await?
        .ok_or_else(|| StoreError::not_found("checkin", id))
}

/// Checkins for one employee, oldest first, optionally limited to a date range.
pub async fn list_checkins_by_employee(
    pool: &SqlitePool,
    employee_id: i64,
    range: Option<DateRange>,
) -> StoreResult<Vec<Checkin>> {
    let checkins = match range {
        Some(range) => {
            sqlx::query_as::<_, Checkin>(&format!(
                r#"
                SELECT {CHECKIN_COLUMNS} FROM checkins
                WHERE employee_id = ?
                AND DATE(checkin_time) BETWEEN ? AND ?
                ORDER BY checkin_time ASC, id ASC
                "#
            ))
            .bind(employee_id)
            .bind(range.from)
            .bind(range.to)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query_as::<_, Checkin>(&format!(
                r#"
                SELECT {CHECKIN_COLUMNS} FROM checkins
                WHERE employee_id = ?
                ORDER BY checkin_time ASC, id ASC
                "#
            ))
            .bind(employee_id)
            .fetch_all(pool)
            .await?
        }
    };

    debug!(employee_id, count = checkins.len(), "Checkins listed");
    Ok(checkins)
}

/// Everyone currently on site.
pub async fn list_active_checkins(pool: &SqlitePool) -> StoreResult<Vec<Checkin>> {
    let checkins = sqlx::query_as::<_, Checkin>(&format!(
        r#"
        SELECT {CHECKIN_COLUMNS} FROM checkins
        WHERE status = ?
        ORDER BY checkin_time ASC, id ASC
        "#
    ))
    .bind(CheckinStatus::CheckedIn)
    .fetch_all(pool)
    .await?;

    Ok(checkins)
}

/// The employee's latest open checkin, if any.
pub async fn active_checkin_for_employee(
    pool: &SqlitePool,
    employee_id: i64,
) -> StoreResult<Option<Checkin>> {
    let checkin = sqlx::query_as::<_, Checkin>(&format!(
        r#"
        SELECT {CHECKIN_COLUMNS} FROM checkins
        WHERE employee_id = ?
        AND status = ?
        ORDER BY checkin_time DESC, id DESC
        LIMIT 1
        "#
    ))
    .bind(employee_id)
    .bind(CheckinStatus::CheckedIn)
    .fetch_optional(pool)
    .await?;

    Ok(checkin)
}
