// ============================
// crates/backend-lib/src/handlers/identity.rs
// ============================
//! Self-service identity routes: signup, login, profile, update, logout.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use identity_common::{
    ApiResponse, AuthPayload, IdentityView, LoginRequest, MessagePayload, SignupRequest,
    UpdateIdentityRequest,
};

use crate::auth::Principal;
use crate::{error::AppError, AppState};

type ApiResult<T> = Result<Json<ApiResponse<T>>, AppError>;

/// `POST /identity`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> ApiResult<AuthPayload> {
    let Json(request) = payload?;
    let created = state.auth.signup(request).await?;
    Ok(Json(ApiResponse::success(created)))
}

/// `POST /identity/login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<AuthPayload> {
    let Json(request) = payload?;
    let session = state.auth.login(request).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// `GET /identity`
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<IdentityView> {
    let view = state.auth.profile(&principal).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `PUT /identity/{id}`
pub async fn update(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateIdentityRequest>, JsonRejection>,
) -> ApiResult<IdentityView> {
    let Json(request) = payload?;
    let view = state.auth.update_own(&principal, &id, request).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `GET /identity/logout`
pub async fn logout(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<MessagePayload> {
    state.auth.logout(&principal).await?;
    Ok(Json(ApiResponse::success(MessagePayload {
        message: "log out successful".to_string(),
    })))
}
