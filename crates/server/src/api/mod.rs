//! HTTP routes.

pub mod auth;
pub mod error;
pub mod extract;
pub mod health;
pub mod insights;
mod response;
pub mod state;
pub mod submissions;
pub mod surveys;
pub mod users;

use std::sync::Arc;

use axum::Router;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::ApiError;
pub use state::AppState;

/// Builds the full API with tracing, CORS and panic recovery applied.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_allow_any_origin {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        CorsLayer::new()
    };

    Router::new()
        .merge(health::create_health_router())
        .merge(auth::create_auth_router())
        .merge(surveys::create_surveys_router())
        .merge(submissions::create_submissions_router())
        .merge(insights::create_insights_router())
        .merge(users::create_users_router())
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
