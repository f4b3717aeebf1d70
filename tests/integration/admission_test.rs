//! Integration tests for admission control over HTTP.

use std::time::Duration;

use http::StatusCode;

use usergate_admission::{DenialReason, Verdict};
use usergate_core::config::RuleMode;
use usergate_entity::Role;

use crate::helpers::{TestApp, test_config};

async fn sign_out(app: &TestApp, ip: &str) -> crate::helpers::TestResponse {
    app.request_with_headers(
        "POST",
        "/api/auth/sign-out",
        None,
        &[("X-Forwarded-For", ip.to_string())],
    )
    .await
}

#[tokio::test]
async fn test_guest_window_scenario() {
    let app = TestApp::with_default_limits();

    for step in 0..5 {
        if step > 0 {
            app.clock.advance(Duration::from_secs(2));
        }
        let response = sign_out(&app, "203.0.113.7").await;
        assert_eq!(response.status, StatusCode::OK, "request at {}s", step * 2);
    }

    app.clock.advance(Duration::from_secs(3));
    let denied = sign_out(&app, "203.0.113.7").await;
    assert_eq!(denied.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.error_code(), "too_many_requests");
    assert_eq!(denied.message(), "Guest request limit exceeded (5/min).");

    app.clock.advance(Duration::from_secs(50));
    let again = sign_out(&app, "203.0.113.7").await;
    assert_eq!(again.status, StatusCode::OK);
}

#[tokio::test]
async fn test_clients_are_counted_separately() {
    let app = TestApp::with_default_limits();

    for _ in 0..5 {
        assert_eq!(sign_out(&app, "198.51.100.1").await.status, StatusCode::OK);
    }
    assert_eq!(
        sign_out(&app, "198.51.100.1").await.status,
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(sign_out(&app, "198.51.100.2").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_user_limit_applies_to_authenticated_role() {
    let app = TestApp::with_default_limits();
    let id = app.create_test_user("olivia", Role::User).await;
    let token = app.token_for(id, Role::User);
    let path = format!("/api/users/{id}");

    for n in 0..10 {
        let response = app.request("GET", &path, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK, "request {n}");
    }

    app.store.reset();
    let denied = app.request("GET", &path, None, Some(&token)).await;
    assert_eq!(denied.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(denied.message(), "User request limit exceeded (10/min).");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_live_bot_denial_is_forbidden() {
    let mut config = test_config();
    config.admission.evaluator.bot_mode = RuleMode::Live;
    let app = TestApp::with_config(config);
    app.evaluator
        .set_verdict(Verdict::deny([DenialReason::RateLimit, DenialReason::Bot]))
        .await;

    let response = sign_out(&app, "192.0.2.10").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.error_code(), "forbidden");
    assert_eq!(response.message(), "Automated requests are not allowed");
}

#[tokio::test]
async fn test_dry_run_bot_denial_is_allowed() {
    let app = TestApp::new();
    app.evaluator
        .set_verdict(Verdict::deny([DenialReason::Bot]))
        .await;

    let response = sign_out(&app, "192.0.2.11").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(app.evaluator.calls(), 1);
}

#[tokio::test]
async fn test_shield_denial_is_forbidden() {
    let app = TestApp::new();
    app.evaluator
        .set_verdict(Verdict::deny([DenialReason::Shield]))
        .await;

    let response = sign_out(&app, "192.0.2.12").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Request blocked by security policy");
}

#[tokio::test]
async fn test_unknown_denial_is_forbidden() {
    let app = TestApp::new();
    app.evaluator.set_verdict(Verdict::deny([])).await;

    let response = sign_out(&app, "192.0.2.13").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Request denied");
}

#[tokio::test]
async fn test_evaluator_failure_fails_closed() {
    let app = TestApp::new();
    let id = app.create_test_user("peggy", Role::User).await;
    app.evaluator.set_failure("evaluator unreachable").await;

    let response = app
        .request(
            "GET",
            &format!("/api/users/{id}"),
            None,
            Some(&app.token_for(id, Role::User)),
        )
        .await;
    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.error_code(), "internal_error");
    assert_eq!(response.message(), "Security middleware error");
    assert_eq!(app.store.calls(), 0);
}

#[tokio::test]
async fn test_disabled_admission_skips_evaluator() {
    let mut config = test_config();
    config.admission.enabled = false;
    let app = TestApp::with_config(config);
    app.evaluator
        .set_verdict(Verdict::deny([DenialReason::Shield]))
        .await;

    for _ in 0..3 {
        assert_eq!(sign_out(&app, "192.0.2.14").await.status, StatusCode::OK);
    }
    assert_eq!(app.evaluator.calls(), 0);
}
