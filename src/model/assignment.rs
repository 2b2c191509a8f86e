use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Assignment {
    pub id: i64,
    pub employee_id: i64,
    pub client_id: i64,
    pub assigned_date: NaiveDate,
}

/// An assignment joined with the client it points at.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AssignedClient {
    pub assignment_id: i64,
    pub client_id: i64,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub assigned_date: NaiveDate,
}
