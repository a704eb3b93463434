//! Admin routes: role gate and unrestricted updates
use axum::http::{Method, StatusCode};
use serde_json::json;

use crate::test_utils::TestApp;

#[tokio::test]
async fn test_admin_updates_another_identity() {
    let app = TestApp::new();
    let (user_id, _) = app.signup("han@rebels.org", "user").await;
    let (_, admin_token) = app.signup("leia@rebels.org", "admin").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/admin/{user_id}"),
            Some(admin_token.as_str()),
            Some(json!({ "email": "peterpan@ymail.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["email"], "peterpan@ymail.com");

    let (status, body) = app
        .send(Method::GET, &format!("/admin/{user_id}"), Some(admin_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "peterpan@ymail.com");
}

#[tokio::test]
async fn test_admin_update_keeps_non_empty_rule() {
    let app = TestApp::new();
    let (user_id, _) = app.signup("han@rebels.org", "user").await;
    let (_, admin_token) = app.signup("leia@rebels.org", "admin").await;

    let (status, body) = app
        .send(Method::PUT, &format!("/admin/{user_id}"), Some(admin_token.as_str()), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 708);
    assert_eq!(body["message"], "At least one field should be updated");
}

#[tokio::test]
async fn test_admin_update_rejects_taken_email() {
    let app = TestApp::new();
    let (user_id, _) = app.signup("han@rebels.org", "user").await;
    app.signup("chewie@rebels.org", "user").await;
    let (_, admin_token) = app.signup("leia@rebels.org", "admin").await;

    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/admin/{user_id}"),
            Some(admin_token.as_str()),
            Some(json!({ "email": "chewie@rebels.org" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 701);
}

#[tokio::test]
async fn test_users_are_denied_admin_routes() {
    let app = TestApp::new();
    let (user_id, user_token) = app.signup("han@rebels.org", "user").await;
    let (admin_id, _) = app.signup("leia@rebels.org", "admin").await;

    let (status, body) = app
        .send(Method::GET, &format!("/admin/{admin_id}"), Some(user_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 709);

    // not even for their own record
    let (status, body) = app
        .send(
            Method::PUT,
            &format!("/admin/{user_id}"),
            Some(user_token.as_str()),
            Some(json!({ "first_name": "Solo" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 709);
}

#[tokio::test]
async fn test_admin_routes_require_a_live_session() {
    let app = TestApp::new();
    let (user_id, _) = app.signup("han@rebels.org", "user").await;
    let (_, admin_token) = app.signup("leia@rebels.org", "admin").await;

    let (status, body) = app
        .send(Method::GET, &format!("/admin/{user_id}"), None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 703);

    app.send(Method::GET, "/identity/logout", Some(admin_token.as_str()), None).await;
    let (status, body) = app
        .send(Method::GET, &format!("/admin/{user_id}"), Some(admin_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 705);
}

#[tokio::test]
async fn test_admin_fetch_of_unknown_identity() {
    let app = TestApp::new();
    let (_, admin_token) = app.signup("leia@rebels.org", "admin").await;

    let (status, body) = app
        .send(Method::GET, "/admin/does-not-exist", Some(admin_token.as_str()), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 706);
}
