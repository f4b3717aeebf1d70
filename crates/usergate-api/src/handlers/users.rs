//! User handlers. Resource policy runs before the store is touched.

use axum::Json;
use axum::extract::State;
use tracing::info;

use usergate_auth::{RequestContext, policy};
use usergate_core::error::AppError;
use usergate_entity::{Role, UserPatch};

use crate::dto::request::UpdateUserRequest;
use crate::dto::response::{MessageResponse, UserEnvelope, UserListResponse, UserResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, Ctx, JsonBody, UserId};
use crate::middleware::log_denial;
use crate::state::AppState;

/// Logs a failed policy check before it becomes the response.
fn enforce(ctx: &RequestContext, decision: Result<(), AppError>) -> Result<(), ApiError> {
    decision.map_err(|err| {
        log_denial(ctx, "policy", &err);
        ApiError(err)
    })
}

/// GET /api/users
pub async fn list_users(
    State(state): State<AppState>,
) -> Result<Json<UserListResponse>, ApiError> {
    info!("Listing users");
    let users: Vec<UserResponse> = state
        .users
        .list_users()
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        message: "Successfully retrieved users".to_string(),
        count: users.len(),
        users,
    }))
}

/// GET /api/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    AuthUser(identity): AuthUser,
    UserId(id): UserId,
) -> Result<Json<UserEnvelope>, ApiError> {
    enforce(&ctx, policy::authorize_read(&identity, id))?;
    let user = state.users.get_user_by_id(id).await?;

    info!(user_id = id, "Retrieved user");
    Ok(Json(UserEnvelope {
        message: "Successfully retrieved user".to_string(),
        user: user.into(),
    }))
}

/// PUT /api/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    AuthUser(identity): AuthUser,
    UserId(id): UserId,
    JsonBody(req): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let mut patch = UserPatch::try_from(req)?;
    enforce(&ctx, policy::authorize_update(&identity, id, &patch))?;

    if let Some(password) = patch.password.take() {
        patch.password = Some(state.password_hasher.hash_password(&password)?);
    }

    let user = state.users.update_user(id, patch).await?;

    info!(user_id = id, by_admin = identity.is_admin(), "Updated user");
    Ok(Json(UserEnvelope {
        message: "User updated successfully".to_string(),
        user: user.into(),
    }))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    Ctx(ctx): Ctx,
    AuthUser(identity): AuthUser,
    UserId(id): UserId,
) -> Result<Json<MessageResponse>, ApiError> {
    enforce(&ctx, policy::authorize_delete(&identity))?;
    state.users.delete_user(id).await?;

    info!(user_id = id, "Deleted user");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
