//! Integration tests for route guards mounted on ad-hoc routers.

use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use http::StatusCode;

use usergate_api::middleware::{guards, identity};
use usergate_auth::RoleGuard;
use usergate_entity::Role;

use crate::helpers::{TestApp, send};

async fn probe() -> &'static str {
    "ok"
}

fn guarded_router(app: &TestApp, guard: RoleGuard) -> Router {
    Router::new()
        .route(
            "/probe",
            get(probe).route_layer(from_fn_with_state(guard, guards::require_role)),
        )
        .layer(from_fn_with_state(
            app.state.clone(),
            identity::attach_identity,
        ))
        .with_state(app.state.clone())
}

#[tokio::test]
async fn test_empty_role_set_is_server_error() {
    let app = TestApp::new();
    let router = guarded_router(&app, RoleGuard::new(&[]));
    let admin_cookie = format!("token={}", app.token_for(1, Role::Admin));

    let anonymous = send(&router, "GET", "/probe", None, &[]).await;
    assert_eq!(anonymous.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(anonymous.error_code(), "server_error");
    assert_eq!(anonymous.message(), "Server configuration error");

    let admin = send(&router, "GET", "/probe", None, &[("Cookie", admin_cookie)]).await;
    assert_eq!(admin.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(admin.error_code(), "server_error");
}

#[tokio::test]
async fn test_multi_role_guard() {
    let app = TestApp::new();
    let router = guarded_router(&app, RoleGuard::new(&[Role::User, Role::Admin]));

    let user_cookie = format!("token={}", app.token_for(2, Role::User));
    let allowed = send(&router, "GET", "/probe", None, &[("Cookie", user_cookie)]).await;
    assert_eq!(allowed.status, StatusCode::OK);

    let anonymous = send(&router, "GET", "/probe", None, &[]).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.message(), "Authentication required");
}

#[tokio::test]
async fn test_user_token_is_forbidden_by_admin_guard() {
    let app = TestApp::new();
    let router = guarded_router(&app, RoleGuard::admin());
    let cookie = format!("token={}", app.token_for(3, Role::User));

    let response = send(&router, "GET", "/probe", None, &[("Cookie", cookie)]).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.message(), "Requires role in [admin]");
}

#[tokio::test]
async fn test_bearer_satisfies_role_guard_but_not_strict() {
    let app = TestApp::new();
    let admin = app.create_test_user("root", Role::Admin).await;
    let token = app.token_for(admin, Role::Admin);

    let router = guarded_router(&app, RoleGuard::admin());
    let lenient = send(
        &router,
        "GET",
        "/probe",
        None,
        &[("Authorization", format!("Bearer {token}"))],
    )
    .await;
    assert_eq!(lenient.status, StatusCode::OK);

    let strict = app.request_bearer("GET", "/api/users", &token).await;
    assert_eq!(strict.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.calls(), 0);
}
