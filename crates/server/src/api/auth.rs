//! Admin registration and login.

use std::sync::Arc;

use axum::{Router, extract::State, http::StatusCode, routing::post};
use survey_api_types::{AuthResponse, LoginRequest, RegisterRequest};
use survey_core::domain::{Identity, validate_password};
use tracing::info;

use super::{error::ApiError, extract::AppJson, state::AppState};
use crate::auth::{hash_password, verify_password};
use crate::error::ServiceError;

pub fn create_auth_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
}

async fn register(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<RegisterRequest>,
) -> Result<(StatusCode, AppJson<AuthResponse>), ApiError> {
    if !state.config.allow_registration {
        return Err(ServiceError::Forbidden("registration is disabled".to_string()).into());
    }

    let identity = Identity::new(&request.name, &request.id_number)?;
    validate_password(&request.password)?;

    let password_hash = hash_password(&request.password)?;
    let user = state.users.create_admin(&identity, password_hash).await?;
    let token = state.keys.issue(user.id, user.role)?;

    info!(user_id = %user.id, "admin registered");
    Ok((
        StatusCode::CREATED,
        AppJson(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    AppJson(request): AppJson<LoginRequest>,
) -> Result<AppJson<AuthResponse>, ApiError> {
    let bad_credentials = || ServiceError::Unauthorized("invalid id number or password".to_string());

    let user = state
        .users
        .find_by_id_number(&request.id_number)
        .await?
        .ok_or_else(bad_credentials)?;

    if !user.role.is_admin() {
        return Err(ServiceError::Forbidden("only admins can sign in".to_string()).into());
    }

    let verified = user
        .password_hash
        .as_deref()
        .is_some_and(|hash| verify_password(&request.password, hash));
    if !verified {
        return Err(bad_credentials().into());
    }

    let token = state.keys.issue(user.id, user.role)?;
    info!(user_id = %user.id, "admin signed in");
    Ok(AppJson(AuthResponse {
        token,
        user: user.into(),
    }))
}
