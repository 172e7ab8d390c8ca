//! Extractors that reject with `ApiError` instead of axum's plain-text bodies.

use std::sync::Arc;

use axum::{
    extract::{FromRequest, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::{error::ApiError, state::AppState};
use crate::auth::Claims;
use crate::error::ServiceError;

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct AppJson<T>(pub T);

impl<T: Serialize> IntoResponse for AppJson<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct AppPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct AppQuery<T>(pub T);

/// Claims of a verified bearer token whose user is still an admin.
#[derive(Debug, Clone)]
pub struct AdminClaims(pub Claims);

impl FromRequestParts<Arc<AppState>> for AdminClaims {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ServiceError::Unauthorized("missing bearer token".to_string()))?;

        let claims = state.keys.verify(token)?;
        if !claims.role.is_admin() {
            return Err(ServiceError::Forbidden("admin role required".to_string()).into());
        }

        match state.users.find_by_id(claims.user_id).await? {
            Some(user) if user.role.is_admin() => Ok(Self(claims)),
            Some(_) => Err(ServiceError::Forbidden("admin role required".to_string()).into()),
            None => Err(ServiceError::Unauthorized("token user no longer exists".to_string()).into()),
        }
    }
}
