pub mod assignment;
pub mod checkin;
pub mod client;
pub mod report;
pub mod role;
pub mod user;

pub use assignment::{AssignedClient, Assignment};
pub use checkin::{Checkin, CheckinStatus, DateRange, NewCheckin};
pub use client::{Client, NewClient};
pub use report::{DailySummary, EmployeeDaySummary, TeamSummary};
pub use role::Role;
pub use user::{NewUser, User, UserUpdate};
