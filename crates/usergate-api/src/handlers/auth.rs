//! Auth handlers: sign-in, sign-out, me.

use std::time::Duration;

use axum::Json;
use axum::extract::State;
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use tracing::info;

use usergate_core::error::AppError;

use crate::dto::request::SignInRequest;
use crate::dto::response::{MeResponse, MessageResponse, SignInResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, JsonBody};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// POST /api/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    jar: CookieJar,
    JsonBody(req): JsonBody<SignInRequest>,
) -> Result<(CookieJar, Json<SignInResponse>), ApiError> {
    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

    if !state
        .password_hasher
        .verify_password(&req.password, &user.password_hash)?
    {
        return Err(AppError::unauthorized(INVALID_CREDENTIALS).into());
    }

    let ttl = Duration::from_secs(state.config.auth.token_ttl_minutes.saturating_mul(60));
    let identity = usergate_entity::Identity::new(user.id, user.email.clone(), user.role);
    let credential = state.codec.issue(&identity, ttl)?;

    let max_age = ttl
        .try_into()
        .map_err(|_| AppError::internal("Token TTL out of range for cookie"))?;
    let cookie = Cookie::build((state.config.auth.cookie_name.clone(), credential.token))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .max_age(max_age)
        .secure(state.config.auth.cookie_secure);

    info!(user_id = user.id, role = %user.role, "User signed in");

    Ok((
        jar.add(cookie),
        Json(SignInResponse {
            message: "User signed in successfully".to_string(),
            user: user.into(),
            expires_at: credential.expires_at,
        }),
    ))
}

/// POST /api/auth/sign-out
///
/// Always emits an expired cookie, whether or not the request carried one.
pub async fn sign_out(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<MessageResponse>) {
    let mut removal = Cookie::build((state.config.auth.cookie_name.clone(), ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .path("/")
        .build();
    removal.make_removal();

    (
        jar.add(removal),
        Json(MessageResponse::new("User signed out successfully")),
    )
}

/// GET /api/auth/me
pub async fn me(AuthUser(identity): AuthUser) -> Json<MeResponse> {
    Json(MeResponse { user: identity })
}
