//! Operations over users, clients, assignments and checkins.
//!
//! Every function takes the shared pool and runs its writes in a single
//! transaction, so constraint checks and the write they guard commit together.

pub mod assignments;
pub mod checkins;
pub mod clients;
pub mod reports;
pub mod users;

pub use assignments::{assign_employee, is_assigned, list_assigned_clients};
pub use checkins::{
    active_checkin_for_employee, check_in, check_out, get_checkin, list_active_checkins,
    list_checkins_by_employee,
};
pub use clients::{create_client, delete_client, get_client, list_clients};
pub use reports::daily_summary;
pub use users::{create_user, delete_user, find_user_by_email, get_user, list_team, update_user};
