use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::geofence::Coordinates;

#[derive(
    Debug,
    Copy,
    Clone,
    Eq,
    PartialEq,
    Serialize,
    Deserialize,
    sqlx::Type,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CheckinStatus {
    CheckedIn,
    CheckedOut,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Checkin {
    pub id: i64,
    pub employee_id: i64,
    pub client_id: i64,
    pub checkin_time: NaiveDateTime,
    pub checkout_time: Option<NaiveDateTime>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Kilometres from the client site, filled in at checkout
    pub distance_from_client: Option<f64>,
    pub notes: Option<String>,
    pub status: CheckinStatus,
}

impl Checkin {
    pub fn is_active(&self) -> bool {
        self.status == CheckinStatus::CheckedIn
    }

    pub fn position(&self) -> Option<Coordinates> {
        Coordinates::from_parts(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone)]
pub struct NewCheckin {
    pub employee_id: i64,
    pub client_id: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub notes: Option<String>,
}

/// Inclusive range of calendar days, matched against the date part of `checkin_time`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}
