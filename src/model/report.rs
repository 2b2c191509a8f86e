use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Per-employee activity for one day.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EmployeeDaySummary {
    pub employee_id: i64,
    pub employee_name: String,
    pub employee_email: String,
    pub checkins: i64,
    pub clients_visited: i64,
    pub total_hours: f64,
    pub avg_distance_km: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TeamSummary {
    pub total_checkins: i64,
    pub total_hours: f64,
    pub employees_active: i64,
    pub unique_clients: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub team_summary: TeamSummary,
    pub employee_breakdown: Vec<EmployeeDaySummary>,
}
