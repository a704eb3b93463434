use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use identity_common::{ApiResponse, IdentityView, UpdateIdentityRequest};

use crate::auth::Principal;
use crate::{error::AppError, AppState};

/// `GET /admin/{id}`
pub async fn get_identity(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<IdentityView>>, AppError> {
    let view = state.auth.admin_profile(&principal, &id).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// `PUT /admin/{id}`. Any account may be updated; the payload still
/// has to name at least one field.
pub async fn update_identity(
    State(state): State<Arc<AppState>>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateIdentityRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<IdentityView>>, AppError> {
    let Json(request) = payload?;
    let view = state.auth.admin_update(&principal, &id, request).await?;
    Ok(Json(ApiResponse::success(view)))
}
