//! Admission control middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use usergate_admission::{Decision, ReasonKind};
use usergate_auth::RequestContext;
use usergate_core::error::AppError;

use crate::error::ApiError;
use crate::middleware::log_denial;
use crate::state::AppState;

/// Runs admission for the attached role; a denial short-circuits before
/// any guard or handler.
pub async fn admit_request(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx = request
        .extensions()
        .get::<RequestContext>()
        .cloned()
        .ok_or_else(|| AppError::internal("Request context missing"))?;

    let subject = ctx.identity().map(|i| i.subject_id);
    let decision = state
        .admission
        .admit(ctx.role(), &ctx.metadata, subject)
        .await?;

    if let Some(err) = denial_error(&decision) {
        log_denial(&ctx, "admission", &err);
        return Err(err.into());
    }

    Ok(next.run(request).await)
}

/// Maps a denying decision to the error returned to the caller.
pub fn denial_error(decision: &Decision) -> Option<AppError> {
    if decision.allowed {
        return None;
    }
    let detail = decision.detail.clone().unwrap_or_default();
    Some(match decision.reason_kind {
        ReasonKind::RateLimit => AppError::rate_limited(detail),
        ReasonKind::Bot | ReasonKind::Shield | ReasonKind::Unknown | ReasonKind::None => {
            AppError::forbidden(detail)
        }
    })
}
