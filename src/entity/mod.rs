pub mod admins;
pub mod audit_logs;
pub mod locations;
pub mod shipment_stopovers;
pub mod shipments;
pub mod users;

pub use admins::Entity as Admins;
pub use audit_logs::Entity as AuditLogs;
pub use locations::Entity as Locations;
pub use shipment_stopovers::Entity as ShipmentStopovers;
pub use shipments::Entity as Shipments;
pub use users::Entity as Users;
