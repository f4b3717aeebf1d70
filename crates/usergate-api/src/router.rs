//! Route definitions for the UserGate HTTP API.
//!
//! All routes are mounted under `/api`. Everything except the health check
//! runs behind identity attachment and admission control; guards are
//! attached per route.

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use usergate_auth::RoleGuard;

use crate::handlers;
use crate::middleware::{admission, cors::build_cors_layer, guards, identity, logging};
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let admitted = Router::new()
        .merge(auth_routes())
        .merge(user_routes(&state))
        .layer(from_fn_with_state(state.clone(), admission::admit_request))
        .layer(from_fn_with_state(state.clone(), identity::attach_identity));

    let api_routes = Router::new().merge(health_routes()).merge(admitted);

    Router::new()
        .nest("/api", api_routes)
        .layer(build_cors_layer(&state.config.server.cors))
        .layer(TraceLayer::new_for_http())
        .layer(from_fn(logging::request_logging))
        .with_state(state)
}

/// Health endpoint, outside admission.
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

/// Auth endpoints: sign-in, sign-out, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/sign-in", post(handlers::auth::sign_in))
        .route("/auth/sign-out", post(handlers::auth::sign_out))
        .route(
            "/auth/me",
            get(handlers::auth::me).route_layer(from_fn(guards::require_auth)),
        )
}

/// User endpoints. Strict cookie authentication wraps every route; listing
/// and deletion additionally require the admin role.
fn user_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::users::list_users)
                .route_layer(from_fn_with_state(RoleGuard::admin(), guards::require_role))
                .route_layer(from_fn_with_state(state.clone(), guards::strict_auth)),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .route_layer(from_fn_with_state(state.clone(), guards::strict_auth)),
        )
        .route(
            "/users/{id}",
            put(handlers::users::update_user)
                .route_layer(from_fn_with_state(state.clone(), guards::strict_auth)),
        )
        .route(
            "/users/{id}",
            delete(handlers::users::delete_user)
                .route_layer(from_fn_with_state(RoleGuard::admin(), guards::require_role))
                .route_layer(from_fn_with_state(state.clone(), guards::strict_auth)),
        )
}
