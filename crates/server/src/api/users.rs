use std::sync::Arc;

use axum::{Router, extract::State, routing::get};
use survey_api_types::UserResponse;

use super::{
    error::ApiError,
    extract::{AdminClaims, AppJson, AppPath},
    state::AppState,
};

pub fn create_users_router() -> Router<Arc<AppState>> {
    Router::new().route("/api/users/by-id-number/{id_number}", get(find_by_id_number))
}

async fn find_by_id_number(
    State(state): State<Arc<AppState>>,
    _admin: AdminClaims,
    AppPath(id_number): AppPath<String>,
) -> Result<AppJson<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id_number(&id_number)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("no user with id number {id_number}")))?;

    Ok(AppJson(user.into()))
}
