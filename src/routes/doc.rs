use utoipa::OpenApi;
use utoipa::openapi::OpenApi as OpenApiSpec;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        auth::{AdminLoginRequest, AdminLoginResponse},
        shipments::{
            CreateShipmentRequest, ShipmentList, UpdateProgressRequest, UpdateShipmentRequest,
        },
        uploads::UploadResponse,
    },
    models::{Coordinates, Customer, Location, Shipment, ShipmentStatus},
    response::{ApiResponse, Meta},
    routes::{admin, health, params, shipments, uploads},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        shipments::list_shipments,
        shipments::create_shipment,
        shipments::get_shipment,
        shipments::update_shipment,
        shipments::delete_shipment,
        admin::login,
        admin::update_progress,
        uploads::upload_image
    ),
    components(
        schemas(
            Shipment,
            ShipmentStatus,
            Location,
            Coordinates,
            Customer,
            CreateShipmentRequest,
            UpdateShipmentRequest,
            UpdateProgressRequest,
            ShipmentList,
            AdminLoginRequest,
            AdminLoginResponse,
            UploadResponse,
            params::Pagination,
            params::ShipmentListQuery,
            Meta,
            ApiResponse<Shipment>,
            ApiResponse<ShipmentList>,
            ApiResponse<AdminLoginResponse>,
            ApiResponse<UploadResponse>
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Shipments", description = "Shipment tracking endpoints"),
        (name = "Admin", description = "Administrator endpoints"),
        (name = "Uploads", description = "Image upload endpoint"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
