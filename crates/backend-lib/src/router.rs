// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router.
use std::sync::Arc;

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{admin, health, identity};
use crate::middleware::{require_admin, require_identity};
use crate::AppState;

/// Build the application router.
///
/// Signup and login are public. Every other identity route runs the
/// session guard first; admin routes additionally require the admin role.
pub fn create_router(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/identity", post(identity::signup))
        .route("/identity/login", post(identity::login));

    let authenticated = Router::new()
        .route("/identity", get(identity::profile))
        .route("/identity/logout", get(identity::logout))
        .route("/identity/{id}", put(identity::update))
        .route_layer(from_fn_with_state(state.clone(), require_identity));

    // layers run outermost-first, so the guard precedes the admin gate
    let admin = Router::new()
        .route(
            "/admin/{id}",
            get(admin::get_identity).put(admin::update_identity),
        )
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), require_identity));

    let api = Router::new().merge(public).merge(authenticated).merge(admin);
    let prefix = state.settings.server.api_prefix.trim_end_matches('/');
    let router = if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    };

    router
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
