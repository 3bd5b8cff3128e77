//! 用户管理集成测试

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use tower::ServiceExt;

mod common;
use common::*;

async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn setup_app() -> (Router, String) {
    let config = create_test_config();
    let pool = setup_test_db(&config).await;
    let state = create_test_app_state(pool).await;

    state
        .auth_service
        .ensure_default_admin("TestPass123!")
        .await
        .expect("Failed to bootstrap admin");

    let app = vps_admin::routes::create_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"username": "admin", "password": "TestPass123!"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let token = json["token"].as_str().unwrap().to_string();

    (app, token)
}

#[tokio::test]
async fn test_create_and_list_users() {
    let (app, token) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &token,
            serde_json::json!({
                "username": "viewer1",
                "password": "ViewerPass123",
                "role": "viewer"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["user"]["username"], "viewer1");
    assert_eq!(json["user"]["role"], "viewer");
    // 响应不包含密码哈希
    assert!(json["user"].get("password_hash").is_none());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/users")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    assert_eq!(json["count"], 2); // admin + viewer1
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let (app, token) = setup_app().await;

    let body = serde_json::json!({
        "username": "duplicated",
        "password": "SomePass123"
    });

    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/users", &token, body.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request("POST", "/api/v1/users", &token, body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("already exists"));
}

#[tokio::test]
async fn test_short_password_rejected() {
    let (app, token) = setup_app().await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &token,
            serde_json::json!({"username": "weakuser", "password": "short"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_deactivate_user_blocks_login() {
    let (app, token) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &token,
            serde_json::json!({"username": "tempuser", "password": "TempPass123"}),
        ))
        .await
        .unwrap();
    let json = json_body(response).await;
    let user_id = json["user"]["id"].as_i64().unwrap();

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            &format!("/api/v1/users/{}/status", user_id),
            &token,
            serde_json::json!({"active": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 被禁用的用户不能再登录
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"username": "tempuser", "password": "TempPass123"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cannot_deactivate_last_active_admin() {
    let (app, token) = setup_app().await;

    // 引导管理员的 ID 是 1（空库第一条记录）
    let response = app
        .oneshot(json_request(
            "PUT",
            "/api/v1/users/1/status",
            &token,
            serde_json::json!({"active": false}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert!(json["error"]["message"]
        .as_str()
        .unwrap()
        .contains("last active admin"));
}

#[tokio::test]
async fn test_change_password_and_login_with_new_one() {
    let (app, token) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/api/v1/users/1/password",
            &token,
            serde_json::json!({"password": "NewAdminPass456"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"username": "admin", "password": "NewAdminPass456"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_viewer_cannot_manage_users() {
    let (app, token) = setup_app().await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &token,
            serde_json::json!({
                "username": "viewer2",
                "password": "ViewerPass123",
                "role": "viewer"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // 以 viewer 身份登录
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"username": "viewer2", "password": "ViewerPass123"})
                        .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = json_body(response).await;
    let viewer_token = json["token"].as_str().unwrap().to_string();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            &viewer_token,
            serde_json::json!({"username": "sneaky", "password": "SneakyPass123"}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
