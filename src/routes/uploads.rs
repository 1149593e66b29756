use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, header},
    routing::post,
};

use crate::{
    dto::uploads::UploadResponse,
    error::AppResult,
    response::ApiResponse,
    services::upload_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload_image))
}

#[utoipa::path(
    post,
    path = "/uploads",
    request_body(content = Vec<u8>, content_type = "image/png"),
    responses(
        (status = 200, description = "Image stored, reference URL returned", body = ApiResponse<UploadResponse>),
        (status = 400, description = "Unsupported type or over the size ceiling"),
    ),
    tag = "Uploads"
)]
pub async fn upload_image(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<ApiResponse<UploadResponse>>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");

    let resp = upload_service::store_image(&state.config, content_type, &body).await?;
    Ok(Json(resp))
}
