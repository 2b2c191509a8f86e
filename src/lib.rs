//! Storage layer for field visit tracking: employees check in at client
//! sites, managers watch who is on site and review daily team activity.
//!
//! Authentication, distance computation and the HTTP surface live with the
//! caller; this crate owns the schema and the rules that keep it consistent.

pub mod config;
pub mod db;
pub mod error;
pub mod geofence;
pub mod model;
pub mod store;
pub mod utils;

pub use error::{StoreError, StoreResult};
pub use geofence::{Coordinates, DistanceCalculator};
