//! Integration tests for the user endpoints and their resource policies.

use http::StatusCode;

use usergate_entity::Role;

use crate::helpers::{LogCapture, TestApp};

#[tokio::test]
async fn test_user_reads_own_profile_only() {
    let app = TestApp::new();
    let me = app.create_test_user("alice", Role::User).await;
    let other = app.create_test_user("bob", Role::User).await;
    let token = app.token_for(me, Role::User);

    let own = app
        .request("GET", &format!("/api/users/{me}"), None, Some(&token))
        .await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["user"]["email"], "alice@test.com");

    app.store.reset();
    let foreign = app
        .request("GET", &format!("/api/users/{other}"), None, Some(&token))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
    assert_eq!(foreign.message(), "You can only access your own profile");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_ownership_checked_before_lookup() {
    let app = TestApp::new();
    let token = app.token_for(42, Role::User);

    let own = app.request("GET", "/api/users/42", None, Some(&token)).await;
    // Ownership passes; the store has no user 42.
    assert_eq!(own.status, StatusCode::NOT_FOUND);

    let foreign = app.request("GET", "/api/users/43", None, Some(&token)).await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_reads_any_profile() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let user = app.create_test_user("dave", Role::User).await;
    let token = app.token_for(admin, Role::Admin);

    let response = app
        .request("GET", &format!("/api/users/{user}"), None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "Successfully retrieved user");
}

#[tokio::test]
async fn test_list_requires_admin() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let user = app.create_test_user("erin", Role::User).await;

    let denied = app
        .request("GET", "/api/users", None, Some(&app.token_for(user, Role::User)))
        .await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);
    assert_eq!(denied.message(), "Requires role in [admin]");
    assert_eq!(app.store.calls(), 0);

    let listing = app
        .request("GET", "/api/users", None, Some(&app.token_for(admin, Role::Admin)))
        .await;
    assert_eq!(listing.status, StatusCode::OK);
    assert_eq!(listing.body["message"], "Successfully retrieved users");
    assert_eq!(listing.body["count"], 2);
    assert_eq!(listing.body["users"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_strict_endpoints_ignore_bearer() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let token = app.token_for(admin, Role::Admin);

    let response = app.request_bearer("GET", "/api/users", &token).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.message(), "Authentication required");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_expired_cookie_never_reaches_store() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let expired = app.expired_token_for(admin, Role::Admin);

    for (method, path) in [
        ("GET", "/api/users".to_string()),
        ("GET", format!("/api/users/{admin}")),
        ("DELETE", format!("/api/users/{admin}")),
    ] {
        let response = app.request(method, &path, None, Some(&expired)).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{method} {path}");
        assert_eq!(response.error_code(), "unauthorized");
    }
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_owner_updates_profile_and_password() {
    let app = TestApp::new();
    let me = app.create_test_user("frank", Role::User).await;
    let token = app.token_for(me, Role::User);

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{me}"),
            Some(serde_json::json!({ "name": "Franklin", "password": "n3w-secret" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], "User updated successfully");
    assert_eq!(response.body["user"]["name"], "Franklin");

    let signed_in = app
        .request(
            "POST",
            "/api/auth/sign-in",
            Some(serde_json::json!({ "email": "frank@test.com", "password": "n3w-secret" })),
            None,
        )
        .await;
    assert_eq!(signed_in.status, StatusCode::OK);
}

#[tokio::test]
async fn test_owner_cannot_change_own_role() {
    let app = TestApp::new();
    let me = app.create_test_user("grace", Role::User).await;
    let token = app.token_for(me, Role::User);

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{me}"),
            Some(serde_json::json!({ "role": "admin" })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Only admins can change roles");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_user_cannot_update_others() {
    let app = TestApp::new();
    let me = app.create_test_user("heidi", Role::User).await;
    let other = app.create_test_user("ivan", Role::User).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{other}"),
            Some(serde_json::json!({ "name": "hacked" })),
            Some(&app.token_for(me, Role::User)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "You can only update your own account");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_admin_changes_role() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let user = app.create_test_user("judy", Role::User).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{user}"),
            Some(serde_json::json!({ "role": "admin" })),
            Some(&app.token_for(admin, Role::Admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["user"]["role"], "admin");
}

#[tokio::test]
async fn test_guest_role_cannot_be_assigned() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let user = app.create_test_user("mia", Role::User).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{user}"),
            Some(serde_json::json!({ "role": "guest" })),
            Some(&app.token_for(admin, Role::Admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "validation_error");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_policy_denials_are_logged() {
    let (logs, _guard) = LogCapture::install();
    let app = TestApp::new();
    let me = app.create_test_user("nina", Role::User).await;
    let other = app.create_test_user("oscar", Role::User).await;
    let token = app.token_for(me, Role::User);
    let headers = [
        ("Cookie", format!("token={token}")),
        ("X-Forwarded-For", "203.0.113.9".to_string()),
    ];

    let read = app
        .request_with_headers("GET", &format!("/api/users/{other}"), None, &headers)
        .await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);
    let promote = app
        .request_with_headers(
            "PUT",
            &format!("/api/users/{me}"),
            Some(serde_json::json!({ "role": "admin" })),
            &headers,
        )
        .await;
    assert_eq!(promote.status, StatusCode::FORBIDDEN);

    let output = logs.contents();
    let denials: Vec<&str> = output
        .lines()
        .filter(|line| line.contains("Request denied") && line.contains("policy"))
        .collect();
    assert_eq!(denials.len(), 2, "{output}");
    for line in &denials {
        assert!(line.contains("role=user"), "{line}");
        assert!(line.contains("client=203.0.x.x"), "{line}");
        assert!(!line.contains("203.0.113.9"), "{line}");
    }
    assert!(denials[0].contains("method=GET"));
    assert!(denials[1].contains("method=PUT"));
}

#[tokio::test]
async fn test_update_duplicate_email_conflicts() {
    let app = TestApp::new();
    let me = app.create_test_user("ken", Role::User).await;
    app.create_test_user("leo", Role::User).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{me}"),
            Some(serde_json::json!({ "email": "leo@test.com" })),
            Some(&app.token_for(me, Role::User)),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.error_code(), "conflict");
    assert_eq!(response.message(), "Email already exists");
}

#[tokio::test]
async fn test_update_rejects_unknown_role_value() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{admin}"),
            Some(serde_json::json!({ "role": "superuser" })),
            Some(&app.token_for(admin, Role::Admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "validation_error");
}

#[tokio::test]
async fn test_admin_deletes_then_not_found() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let user = app.create_test_user("mallory", Role::User).await;
    let token = app.token_for(admin, Role::Admin);
    let path = format!("/api/users/{user}");

    let deleted = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.message(), "User deleted successfully");

    let again = app.request("DELETE", &path, None, Some(&token)).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
    assert_eq!(again.error_code(), "not_found");
    assert_eq!(again.message(), "User not found");
}

#[tokio::test]
async fn test_user_cannot_delete() {
    let app = TestApp::new();
    let me = app.create_test_user("nina", Role::User).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/users/{me}"),
            None,
            Some(&app.token_for(me, Role::User)),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_malformed_id_is_bad_request() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;

    let response = app
        .request(
            "GET",
            "/api/users/abc",
            None,
            Some(&app.token_for(admin, Role::Admin)),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "validation_error");
    assert_eq!(app.store.calls(), 0);
}
