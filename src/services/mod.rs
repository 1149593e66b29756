pub mod admin_service;
pub mod shipment_service;
pub mod upload_service;
