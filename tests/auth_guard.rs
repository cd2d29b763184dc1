// tests/auth_guard.rs
// Autenticação, papéis e validação de entrada: tudo falha antes de tocar o banco.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use serde_json::json;
use uuid::Uuid;

use common::{admin_token, jwt_keys, manager_token, offline_app, request, send};
use stall_backend::models::auth::Role;

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = offline_app();

    let (status, body) = send(&app, request("GET", "/api/stalls", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = offline_app();

    let (status, body) = send(&app, request("GET", "/api/auth/me", Some("not-a-jwt"), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token");
}

#[tokio::test]
async fn token_signed_with_another_secret_is_unauthorized() {
    let app = offline_app();
    let foreign = stall_backend::services::auth::JwtKeys::new("other-secret", Duration::hours(1))
        .issue(Uuid::new_v4(), "admin", Role::Admin, None)
        .unwrap();

    let (status, _) = send(&app, request("GET", "/api/auth/me", Some(&foreign), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let app = offline_app();
    let token = jwt_keys()
        .issue_at(Uuid::new_v4(), "admin", Role::Admin, None, Utc::now() - Duration::hours(25))
        .unwrap();

    let (status, body) = send(&app, request("GET", "/api/auth/verify-token", Some(&token), None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token expired");
}

#[tokio::test]
async fn me_echoes_the_token_identity() {
    let app = offline_app();
    let manager_id = Uuid::new_v4();
    let token = manager_token(manager_id);

    let (status, body) = send(&app, request("GET", "/api/auth/me", Some(&token), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["id"], manager_id.to_string());
    assert_eq!(body["data"]["userType"], "branch_manager");
    assert_eq!(body["data"]["branchManagerId"], manager_id.to_string());
}

#[tokio::test]
async fn verify_token_reports_expiry() {
    let app = offline_app();

    let (status, body) = send(&app, request("GET", "/api/auth/verify-token", Some(&admin_token()), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["user"]["userType"], "admin");
    assert!(body["data"]["expiresAt"].is_string());
}

#[tokio::test]
async fn logout_is_acknowledged() {
    let app = offline_app();

    let (status, body) = send(&app, request("POST", "/api/auth/logout", Some(&admin_token()), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");
}

#[tokio::test]
async fn managers_cannot_reach_admin_routes() {
    let app = offline_app();
    let token = manager_token(Uuid::new_v4());
    let payload = json!({ "name": "North", "area": "Naga", "location": "Centro" });

    let (status, body) = send(&app, request("POST", "/api/branches", Some(&token), Some(payload))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(&app, request("GET", "/api/branches", Some(&token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let uri = format!("/api/applicants/{}", Uuid::new_v4());
    let (status, _) = send(&app, request("DELETE", &uri, Some(&token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn admins_cannot_use_manager_only_routes() {
    let app = offline_app();
    let token = admin_token();

    let (status, _) = send(
        &app,
        request("POST", "/api/floors", Some(&token), Some(json!({ "floorNumber": 1, "floorName": "Ground" }))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, request("GET", "/api/auth/branch-manager-info", Some(&token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_body_fields_are_rejected() {
    let app = offline_app();
    let payload = json!({ "name": "North", "area": "Naga", "location": "Centro", "owner": "x" });

    let (status, body) = send(&app, request("POST", "/api/branches", Some(&admin_token()), Some(payload))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Malformed request body.");
}

#[tokio::test]
async fn empty_login_fields_fail_validation() {
    let app = offline_app();
    let payload = json!({ "username": "", "password": "" });

    let (status, body) = send(&app, request("POST", "/api/auth/admin/login", None, Some(payload))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["username"].is_array());
    assert!(body["details"]["password"].is_array());
}

#[tokio::test]
async fn malformed_path_id_is_a_bad_request() {
    let app = offline_app();

    let (status, body) = send(&app, request("GET", "/api/stalls/not-a-uuid", Some(&admin_token()), None)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Malformed path parameter.");
}

#[tokio::test]
async fn invalid_status_target_is_rejected_before_any_write() {
    let app = offline_app();
    let uri = format!("/api/applications/{}/status", Uuid::new_v4());

    let (status, body) = send(
        &app,
        request("PUT", &uri, Some(&admin_token()), Some(json!({ "status": "Archived" }))),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid status. Must be one of: Pending, Approved, Rejected, Cancelled"
    );
}

#[tokio::test]
async fn landing_area_lookups_require_an_area() {
    let app = offline_app();

    for uri in [
        "/api/landing/stalls/locations",
        "/api/landing/stalls/by-area",
        "/api/landing/stalls/by-area?area=%20",
    ] {
        let (status, body) = send(&app, request("GET", uri, None, None)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["message"], "Area parameter is required");
    }
}

#[tokio::test]
async fn openapi_document_is_public() {
    let app = offline_app();

    let (status, body) = send(&app, request("GET", "/api/docs/openapi.json", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/stalls"].is_object());
    assert!(body["components"]["securitySchemes"]["api_jwt"].is_object());
}
