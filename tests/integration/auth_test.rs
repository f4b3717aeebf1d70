//! Integration tests for sign-in, sign-out, and identity attachment.

use http::StatusCode;

use usergate_core::config::AttachMode;
use usergate_entity::Role;

use crate::helpers::{self, PASSWORD, TestApp};

#[tokio::test]
async fn test_sign_in_sets_session_cookie() {
    let app = TestApp::new();
    let id = app.create_test_user("alice", Role::User).await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(serde_json::json!({ "email": "alice@test.com", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["id"], id);
    assert!(response.body["user"].get("password_hash").is_none());

    let cookie = response.set_cookie().expect("sign-in must set a cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));
    assert!(!cookie.contains("Secure"));
}

#[tokio::test]
async fn test_sign_in_cookie_is_usable() {
    let app = TestApp::new();
    app.create_test_user("bob", Role::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(serde_json::json!({ "email": "bob@test.com", "password": PASSWORD })),
            None,
        )
        .await;
    let cookie = response.set_cookie().expect("cookie").to_string();
    let token = cookie
        .split(';')
        .next()
        .and_then(|pair| pair.strip_prefix("token="))
        .expect("token value");

    let listing = app.request("GET", "/api/users", None, Some(token)).await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body["count"], 1);
}

#[tokio::test]
async fn test_sign_in_rejects_bad_credentials() {
    let app = TestApp::new();
    app.create_test_user("carol", Role::User).await;

    for body in [
        serde_json::json!({ "email": "carol@test.com", "password": "wrong" }),
        serde_json::json!({ "email": "nobody@test.com", "password": PASSWORD }),
    ] {
        let response = app
            .request("POST", "/api/auth/sign-in", Some(body), None)
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.error_code(), "unauthorized");
        assert!(response.set_cookie().is_none());
    }
}

#[tokio::test]
async fn test_sign_in_malformed_body() {
    let app = TestApp::new();
    let response = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(serde_json::json!({ "email": 42 })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "validation_error");
}

#[tokio::test]
async fn test_sign_out_clears_cookie() {
    let app = TestApp::new();
    let response = app.request("POST", "/api/auth/sign-out", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let cookie = response.set_cookie().expect("sign-out must clear the cookie");
    assert!(cookie.starts_with("token="));
    assert!(cookie.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_me_requires_identity() {
    let app = TestApp::new();

    let anonymous = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.message(), "Authentication required");

    let token = app.token_for(7, Role::User);
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["subject_id"], 7);
    assert_eq!(response.body["user"]["role"], "user");
}

#[tokio::test]
async fn test_me_accepts_bearer_fallback() {
    let app = TestApp::new();
    let token = app.token_for(9, Role::Admin);
    let response = app.request_bearer("GET", "/api/auth/me", &token).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_bearer_ignored_without_header_fallback() {
    let mut config = helpers::test_config();
    config.auth.header_fallback = false;
    let app = TestApp::with_config(config);
    let token = app.token_for(9, Role::Admin);
    let response = app.request_bearer("GET", "/api/auth/me", &token).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_credential_is_anonymous_when_lenient() {
    let app = TestApp::new();

    let response = app
        .request("POST", "/api/auth/sign-out", None, Some("garbage"))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let me = app.request("GET", "/api/auth/me", None, Some("garbage")).await;
    assert_eq!(me.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_invalid_credential_rejected_when_blocking() {
    let mut config = helpers::test_config();
    config.auth.attach_mode = AttachMode::Blocking;
    let app = TestApp::with_config(config);

    let response = app
        .request("POST", "/api/auth/sign-out", None, Some("garbage"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.error_code(), "unauthorized");

    let anonymous = app.request("POST", "/api/auth/sign-out", None, None).await;
    assert_eq!(anonymous.status, StatusCode::OK);
}

#[tokio::test]
async fn test_health_is_outside_admission() {
    let app = TestApp::with_default_limits();
    for _ in 0..10 {
        let response = app.request("GET", "/api/health", None, None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.body["status"], "ok");
    }
    assert_eq!(app.evaluator.calls(), 0);
}
