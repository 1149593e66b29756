use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod doc;
pub mod health;
pub mod params;
pub mod shipments;
pub mod uploads;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/shipments", shipments::router())
        .nest("/admin", admin::router())
        .nest("/uploads", uploads::router())
}
