pub mod auth;
pub mod shipments;
pub mod uploads;
