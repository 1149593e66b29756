use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};

use crate::{
    dto::shipments::{
        CreateShipmentRequest, ShipmentList, UpdateShipmentRequest,
    },
    error::AppResult,
    models::Shipment,
    response::ApiResponse,
    routes::params::ShipmentListQuery,
    services::shipment_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_shipments).post(create_shipment))
        .route(
            "/{id}",
            get(get_shipment)
                .patch(update_shipment)
                .delete(delete_shipment),
        )
}

#[utoipa::path(
    get,
    path = "/shipments",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status"),
        ("sort_order" = Option<String>, Query, description = "Sort by creation time: asc, desc (default)")
    ),
    responses(
        (status = 200, description = "List shipments, newest first", body = ApiResponse<ShipmentList>),
    ),
    tag = "Shipments"
)]
pub async fn list_shipments(
    State(state): State<AppState>,
    Query(query): Query<ShipmentListQuery>,
) -> AppResult<Json<ApiResponse<ShipmentList>>> {
    let resp = shipment_service::list_shipments(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/shipments",
    request_body = CreateShipmentRequest,
    responses(
        (status = 201, description = "Shipment created", body = ApiResponse<Shipment>),
        (status = 400, description = "Validation failure naming the offending field"),
    ),
    tag = "Shipments"
)]
pub async fn create_shipment(
    State(state): State<AppState>,
    Json(payload): Json<CreateShipmentRequest>,
) -> AppResult<(StatusCode, Json<ApiResponse<Shipment>>)> {
    let resp = shipment_service::create_shipment(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

#[utoipa::path(
    get,
    path = "/shipments/{id}",
    params(("id" = String, Path, description = "Tracking ID")),
    responses(
        (status = 200, description = "Hydrated shipment", body = ApiResponse<Shipment>),
        (status = 404, description = "Not Found"),
    ),
    tag = "Shipments"
)]
pub async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<Shipment>>> {
    let resp = shipment_service::get_shipment(&state, &id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/shipments/{id}",
    params(("id" = String, Path, description = "Tracking ID")),
    request_body = UpdateShipmentRequest,
    responses(
        (status = 200, description = "Updated shipment", body = ApiResponse<Shipment>),
        (status = 400, description = "Index out of route bounds"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Shipments"
)]
pub async fn update_shipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateShipmentRequest>,
) -> AppResult<Json<ApiResponse<Shipment>>> {
    let resp = shipment_service::update_shipment(&state, &id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/shipments/{id}",
    params(("id" = String, Path, description = "Tracking ID")),
    responses(
        (status = 200, description = "Shipment deleted"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Shipments"
)]
pub async fn delete_shipment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = shipment_service::delete_shipment(&state, &id).await?;
    Ok(Json(resp))
}
