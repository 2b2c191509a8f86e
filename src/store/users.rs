use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, instrument, warn};

use crate::{
    error::{StoreError, StoreResult},
    model::{NewUser, Role, User, UserUpdate},
    utils::db_utils::{SqlValue, build_update_sql, count_references, execute_update, now},
};

const USER_COLUMNS: &str =
    "id, name, email, password, role, manager_id, created_at, updated_at";

async fn fetch_user(conn: &mut SqliteConnection, id: i64) -> StoreResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(user)
}

/// Fails unless `manager_id` names an existing user with the manager role.
async fn ensure_manager(conn: &mut SqliteConnection, manager_id: i64) -> StoreResult<()> {
    let role = sqlx::query_scalar::<_, Role>("SELECT role FROM users WHERE id = ?")
        .bind(manager_id)
        .fetch_optional(conn)
        .await?;

    match role {
        Some(Role::Manager) => Ok(()),
        Some(role) => {
            warn!(manager_id, %role, "Manager reference points at a non-manager");
            Err(StoreError::InvalidReference(format!(
                "user {manager_id} is not a manager"
            )))
        }
        None => {
            warn!(manager_id, "Manager reference points at an unknown user");
            Err(StoreError::InvalidReference(format!(
                "manager {manager_id} does not exist"
            )))
        }
    }
}

/// Inserts a user; the email must be free and any manager reference must
/// name an existing manager.
#[instrument(skip(pool, new_user), fields(email = %new_user.email, role = %new_user.role))]
pub async fn create_user(pool: &SqlitePool, new_user: NewUser) -> StoreResult<User> {
    let mut tx = pool.begin().await?;

    let timestamp = now();
    let inserted = sqlx::query_as::<_, User>(&format!(
        r#"
        INSERT INTO users (name, email, password, role, manager_id, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        RETURNING {USER_COLUMNS}
        "#
    ))
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(&new_user.password_hash)
    .bind(new_user.role)
    .bind(new_user.manager_id)
    .bind(timestamp)
    .bind(timestamp)
    .fetch_one(&mut *tx)
    .await;

    let user = match inserted.map_err(StoreError::from) {
        Ok(user) => user,
        Err(StoreError::DuplicateKey(_)) => {
            warn!("Email already registered");
            return Err(StoreError::DuplicateKey(format!(
                "email {} already exists",
                new_user.email
            )));
        }
        Err(e) => return Err(e),
    };

    if let Some(manager_id) = user.manager_id {
        if manager_id == user.id {
            return Err(StoreError::InvalidReference(format!(
                "user {manager_id} cannot manage themselves"
            )));
        }
        ensure_manager(&mut tx, manager_id).await?;
    }

    tx.commit().await?;

    info!(user_id = user.id, "User created");
    Ok(user)
}

pub async fn get_user(pool: &SqlitePool, id: i64) -> StoreResult<User> {
    let mut conn = pool.acquire().await?;

    fetch_user(&mut conn, id)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))
}

/// Login lookup. Credential verification is the caller's job.
pub async fn find_user_by_email(pool: &SqlitePool, email: &str) -> StoreResult<Option<User>> {
    debug!(email, "Looking up user by email");

    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = ?"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Users reporting to `manager_id`, by name.
pub async fn list_team(pool: &SqlitePool, manager_id: i64) -> StoreResult<Vec<User>> {
    let team = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE manager_id = ? ORDER BY name, id"
    ))
    .bind(manager_id)
    .fetch_all(pool)
    .await?;

    debug!(manager_id, members = team.len(), "Team listed");
    Ok(team)
}

/// Applies the supplied fields and bumps `updated_at`.
#[instrument(skip(pool, update))]
pub async fn update_user(pool: &SqlitePool, id: i64, update: UserUpdate) -> StoreResult<User> {
    if update.is_empty() {
        return Err(StoreError::InvalidState(format!(
            "no fields provided for user {id}"
        )));
    }

    let mut columns = Vec::new();

    if let Some(name) = update.name {
        columns.push(("name", SqlValue::String(name)));
    }
    if let Some(email) = update.email {
        columns.push(("email", SqlValue::String(email)));
    }
    if let Some(role) = update.role {
        columns.push(("role", SqlValue::String(role.to_string())));
    }
    if let Some(manager_id) = update.manager_id {
        columns.push(("manager_id", manager_id.map_or(SqlValue::Null, SqlValue::I64)));
    }
    columns.push(("updated_at", SqlValue::DateTime(now())));

    let mut tx = pool.begin().await?;

    let update_sql = build_update_sql("users", columns, "id", id)?;
    let updated = match execute_update(&mut tx, update_sql).await.map_err(StoreError::from) {
        Ok(updated) => updated,
        Err(StoreError::DuplicateKey(_)) => {
            warn!(user_id = id, "Email already registered");
            return Err(StoreError::DuplicateKey(
                "email already registered to another user".to_string(),
            ));
        }
        Err(e) => return Err(e),
    };

    if updated == 0 {
        return Err(StoreError::not_found("user", id));
    }

    if update.manager_id == Some(Some(id)) {
        return Err(StoreError::InvalidReference(format!(
            "user {id} cannot manage themselves"
        )));
    }

    let user = fetch_user(&mut tx, id)
        .await?
        .ok_or_else(|| StoreError::not_found("user", id))?;

    if let Some(manager_id) = update.manager_id.flatten() {
        ensure_manager(&mut tx, manager_id).await?;
    }

    if !user.role.is_manager() {
        let reports = count_references(&mut tx, "users", "manager_id", id).await?;
        if reports > 0 {
            warn!(user_id = id, reports, "Demotion blocked by team members");
            return Err(StoreError::InvalidState(format!(
                "user {id} still manages {reports} users"
            )));
        }
    }

    tx.commit().await?;

    info!(user_id = id, "User updated");
    Ok(user)
}

/// Deletes a user with no assignments, checkins or team members.
#[instrument(skip(pool))]
pub async fn delete_user(pool: &SqlitePool, id: i64) -> StoreResult<()> {
    let mut tx = pool.begin().await?;

    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(StoreError::from);

    match deleted {
        Ok(result) if result.rows_affected() == 0 => {
            return Err(StoreError::not_found("user", id));
        }
        Ok(_) => {}
        Err(StoreError::InvalidReference(_)) => {
            warn!(user_id = id, "Delete blocked by assignments or checkins");
            return Err(StoreError::InvalidState(format!(
                "user {id} still has assignments or checkins"
            )));
        }
        Err(e) => return Err(e),
    }

    let reports = count_references(&mut tx, "users", "manager_id", id).await?;
    if reports > 0 {
        warn!(user_id = id, reports, "Delete blocked by team members");
        return Err(StoreError::InvalidState(format!(
            "user {id} still manages {reports} users"
        )));
    }

    tx.commit().await?;

    info!(user_id = id, "User deleted");
    Ok(())
}
