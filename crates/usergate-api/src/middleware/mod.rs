//! Axum middleware stack.
//!
//! Order per request: request logging, identity attachment, admission,
//! then route-level guards.

pub mod admission;
pub mod cors;
pub mod guards;
pub mod identity;
pub mod logging;

use tracing::warn;

use usergate_auth::RequestContext;
use usergate_core::error::AppError;

/// Logs a denial with the caller's role and a redacted client identifier.
pub(crate) fn log_denial(ctx: &RequestContext, stage: &'static str, err: &AppError) {
    warn!(
        stage,
        kind = %err.kind,
        role = %ctx.role(),
        path = %ctx.metadata.path,
        method = %ctx.metadata.method,
        client = %ctx.metadata.redacted_client(),
        reason = %err.message,
        "Request denied"
    );
}
