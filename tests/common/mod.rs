#![allow(dead_code)]

use checkin_store::{
    Coordinates, db,
    model::{NewClient, NewUser, Role},
    store,
};
use chrono::NaiveDate;
use sqlx::SqlitePool;

/// bcrypt("password123", cost 10)
pub const PASSWORD_HASH: &str = "$2b$10$K7L1OJ45/4Y2nIvhRVpCe.FGOw01OOrL8YcEZEu93h9xV87zfmPOe";

pub async fn pool() -> SqlitePool {
    db::init_memory_db().await.expect("in-memory database")
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Flat-earth distance, good enough to check what gets persisted.
pub fn planar_km(from: Coordinates, to: Coordinates) -> f64 {
    let dlat = from.latitude - to.latitude;
    let dlon = from.longitude - to.longitude;
    (dlat * dlat + dlon * dlon).sqrt() * 111.0
}

pub fn new_user(name: &str, email: &str, role: Role, manager_id: Option<i64>) -> NewUser {
    NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: PASSWORD_HASH.to_string(),
        role,
        manager_id,
    }
}

pub fn new_client(name: &str, address: &str, latitude: f64, longitude: f64) -> NewClient {
    NewClient {
        name: name.to_string(),
        address: Some(address.to_string()),
        latitude: Some(latitude),
        longitude: Some(longitude),
    }
}

/// Ids of the demo rows.
pub struct Demo {
    pub amit: i64,
    pub rahul: i64,
    pub priya: i64,
    pub vikram: i64,
    pub abc_corp: i64,
    pub xyz_ltd: i64,
    pub tech_solutions: i64,
    pub global_services: i64,
    pub innovate_inc: i64,
}

/// The demo team: one manager, three employees, five Gurugram/Noida clients,
/// seven assignments and six checkins (one still open).
pub async fn seed_demo(pool: &SqlitePool) -> Demo {
    let amit = store::create_user(
        pool,
        new_user("Amit Sharma", "manager@unolo.com", Role::Manager, None),
    )
    .await
    .unwrap()
    .id;
    let rahul = store::create_user(
        pool,
        new_user("Rahul Kumar", "rahul@unolo.com", Role::Employee, Some(amit)),
    )
    .await
    .unwrap()
    .id;
    let priya = store::create_user(
        pool,
        new_user("Priya Singh", "priya@unolo.com", Role::Employee, Some(amit)),
    )
    .await
    .unwrap()
    .id;
    let vikram = store::create_user(
        pool,
        new_user("Vikram Patel", "vikram@unolo.com", Role::Employee, Some(amit)),
    )
    .await
    .unwrap()
    .id;

    let abc_corp = store::create_client(
        pool,
        new_client("ABC Corp", "Cyber City, Gurugram", 28.4946, 77.0887),
    )
    .await
    .unwrap()
    .id;
    let xyz_ltd = store::create_client(
        pool,
        new_client("XYZ Ltd", "Sector 44, Gurugram", 28.4595, 77.0266),
    )
    .await
    .unwrap()
    .id;
    let tech_solutions = store::create_client(
        pool,
        new_client("Tech Solutions", "DLF Phase 3, Gurugram", 28.4947, 77.0952),
    )
    .await
    .unwrap()
    .id;
    let global_services = store::create_client(
        pool,
        new_client("Global Services", "Udyog Vihar, Gurugram", 28.5011, 77.0838),
    )
    .await
    .unwrap()
    .id;
    let innovate_inc = store::create_client(
        pool,
        new_client("Innovate Inc", "Sector 18, Noida", 28.5707, 77.3219),
    )
    .await
    .unwrap()
    .id;

    for (employee, client, day) in [
        (rahul, abc_corp, date(2024, 1, 1)),
        (rahul, xyz_ltd, date(2024, 1, 1)),
        (rahul, tech_solutions, date(2024, 1, 15)),
        (priya, xyz_ltd, date(2024, 1, 1)),
        (priya, global_services, date(2024, 1, 1)),
        (vikram, abc_corp, date(2024, 1, 10)),
        (vikram, innovate_inc, date(2024, 1, 10)),
    ] {
        store::assign_employee(pool, employee, client, day).await.unwrap();
    }

    let checkins = [
        (
            rahul,
            abc_corp,
            "2024-01-15 09:15:00",
            Some("2024-01-15 11:30:00"),
            28.4946,
            77.0887,
            "Regular visit",
        ),
        (
            rahul,
            xyz_ltd,
            "2024-01-15 12:00:00",
            Some("2024-01-15 14:00:00"),
            28.4595,
            77.0266,
            "Product demo",
        ),
        (
            rahul,
            tech_solutions,
            "2024-01-15 15:00:00",
            Some("2024-01-15 17:30:00"),
            28.4947,
            77.0952,
            "Follow up meeting",
        ),
        (
            priya,
            xyz_ltd,
            "2024-01-15 09:30:00",
            Some("2024-01-15 12:00:00"),
            28.4595,
            77.0266,
            "Contract discussion",
        ),
        (
            priya,
            global_services,
            "2024-01-15 13:00:00",
            Some("2024-01-15 16:00:00"),
            28.5011,
            77.0838,
            "New requirements",
        ),
        (rahul, abc_corp, "2024-01-16 09:00:00", None, 28.4950, 77.0890, "Morning visit"),
    ];
    for (employee, client, checkin_time, checkout_time, lat, lon, notes) in checkins {
        insert_checkin(pool, employee, client, checkin_time, checkout_time, lat, lon, notes).await;
    }

    Demo {
        amit,
        rahul,
        priya,
        vikram,
        abc_corp,
        xyz_ltd,
        tech_solutions,
        global_services,
        innovate_inc,
    }
}

/// Inserts a historical checkin with explicit timestamps.
pub async fn insert_checkin(
    pool: &SqlitePool,
    employee_id: i64,
    client_id: i64,
    checkin_time: &str,
    checkout_time: Option<&str>,
    latitude: f64,
    longitude: f64,
    notes: &str,
) -> i64 {
    let status = if checkout_time.is_some() { "checked_out" } else { "checked_in" };

    sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO checkins
            (employee_id, client_id, checkin_time, checkout_time,
             latitude, longitude, notes, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id
        "#,
    )
    .bind(employee_id)
    .bind(client_id)
    .bind(checkin_time)
    .bind(checkout_time)
    .bind(latitude)
    .bind(longitude)
    .bind(notes)
    .bind(status)
    .fetch_one(pool)
    .await
    .expect("fixture checkin")
}
