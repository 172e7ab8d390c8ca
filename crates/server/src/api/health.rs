use std::sync::Arc;

use axum::{Json, Router, routing::get};
use survey_api_types::HealthCheckResponse;

use super::state::AppState;

pub fn create_health_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/health", get(health_check))
}

async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::ok())
}
