//! Route-level authentication and role guards.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::CookieJar;

use usergate_auth::gate::{authenticate_strict, require_authenticated};
use usergate_auth::{CredentialSource, RequestContext, RoleGuard};
use usergate_core::error::AppError;

use crate::error::ApiError;
use crate::middleware::log_denial;
use crate::state::AppState;

fn context(request: &Request) -> Result<RequestContext, AppError> {
    request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .ok_or_else(|| AppError::internal("Request context missing"))
}

/// Cookie-only authentication; replaces whatever identity was attached.
pub async fn strict_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = context(&request)?;
    let jar = CookieJar::from_headers(request.headers());
    let cookie = jar.get(state.attacher.cookie_name()).map(|c| c.value());

    let identity = match authenticate_strict(&state.codec, cookie) {
        Ok(identity) => identity,
        Err(err) => {
            log_denial(&ctx, "strict_auth", &err);
            return Err(err.into());
        }
    };

    request
        .extensions_mut()
        .insert(ctx.with_identity(identity, CredentialSource::Cookie));
    Ok(next.run(request).await)
}

/// Rejects anonymous callers with 401.
pub async fn require_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    let ctx = context(&request)?;
    if let Err(err) = require_authenticated(&ctx) {
        log_denial(&ctx, "require_auth", &err);
        return Err(err.into());
    }
    Ok(next.run(request).await)
}

/// Admits only the roles in the guard's state.
pub async fn require_role(
    State(guard): State<RoleGuard>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = context(&request)?;
    if let Err(err) = guard.check(&ctx) {
        if !err.kind.is_server_error() {
            log_denial(&ctx, "require_role", &err);
        }
        return Err(err.into());
    }
    Ok(next.run(request).await)
}
