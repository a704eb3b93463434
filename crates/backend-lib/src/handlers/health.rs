use axum::Json;
use identity_common::{ApiResponse, MessagePayload};

/// Liveness probe
pub async fn health() -> Json<ApiResponse<MessagePayload>> {
    Json(ApiResponse::success(MessagePayload {
        message: "ok".to_string(),
    }))
}
