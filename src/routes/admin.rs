use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{patch, post},
};

use crate::{
    dto::{
        auth::{AdminLoginRequest, AdminLoginResponse},
        shipments::UpdateProgressRequest,
    },
    error::AppResult,
    models::Shipment,
    response::ApiResponse,
    services::{admin_service, shipment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/shipments/{id}/progress", patch(update_progress))
}

#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Authentication successful", body = ApiResponse<AdminLoginResponse>),
        (status = 401, description = "Invalid credentials"),
    ),
    tag = "Admin"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> AppResult<Json<ApiResponse<AdminLoginResponse>>> {
    let resp = admin_service::login_admin(&state.pool, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/admin/shipments/{id}/progress",
    params(("id" = String, Path, description = "Tracking ID")),
    request_body = UpdateProgressRequest,
    responses(
        (status = 200, description = "Progress updated", body = ApiResponse<Shipment>),
        (status = 400, description = "Index out of route bounds"),
        (status = 404, description = "Not Found"),
    ),
    tag = "Admin"
)]
pub async fn update_progress(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateProgressRequest>,
) -> AppResult<Json<ApiResponse<Shipment>>> {
    let resp = shipment_service::update_progress(&state, &id, payload).await?;
    Ok(Json(resp))
}
