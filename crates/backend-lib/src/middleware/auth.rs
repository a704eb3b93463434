use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::auth::{self, Principal};
use crate::{error::AppError, AppState};

/// Authenticate the bearer token and attach the `Principal` to the request
pub async fn require_identity(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| value.to_str().map_err(|_| AppError::InvalidAuthScheme))
        .transpose()?;

    let principal = state.auth.authenticate(header).await?;
    tracing::debug!(id = %principal.id, role = %principal.role, "request authenticated");

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

/// Reject non-admin principals. Must run after `require_identity`.
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let principal = request
        .extensions()
        .get::<Principal>()
        .ok_or(AppError::MissingAuthHeader)?;
    auth::require_admin(principal)?;
    Ok(next.run(request).await)
}
