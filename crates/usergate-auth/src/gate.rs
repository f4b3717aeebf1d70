//! Coarse authentication and role guards.
//!
//! These run as route configuration ahead of handlers. Resource-level
//! checks live in [`crate::policy`].

use std::sync::Arc;

use tracing::error;

use usergate_core::error::AppError;
use usergate_entity::{Identity, Role};

use crate::context::RequestContext;
use crate::token::TokenCodec;

/// Fails with `Unauthorized` when no identity is attached.
pub fn require_authenticated(ctx: &RequestContext) -> Result<&Identity, AppError> {
    ctx.identity()
        .ok_or_else(|| AppError::unauthorized("Authentication required"))
}

/// Cookie-only authentication that never proceeds under an uncertain identity.
///
/// Header credentials are not consulted. Fails with `Unauthorized` when the
/// cookie is absent or does not verify.
pub fn authenticate_strict(codec: &TokenCodec, cookie: Option<&str>) -> Result<Identity, AppError> {
    let token = cookie
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

    codec.verify(token).map_err(|e| {
        AppError::unauthorized(format!(
            "Invalid or expired authentication token: {}",
            e.message
        ))
    })
}

/// Role guard configured per route.
#[derive(Debug, Clone)]
pub struct RoleGuard {
    allowed: Arc<[Role]>,
}

impl RoleGuard {
    /// Creates a guard admitting any of `allowed`.
    pub fn new(allowed: &[Role]) -> Self {
        Self {
            allowed: allowed.into(),
        }
    }

    /// Guard admitting only administrators.
    pub fn admin() -> Self {
        Self::new(&[Role::Admin])
    }

    /// Checks the context against the allowed roles.
    ///
    /// An empty role set is a configuration defect and yields `Misconfigured`
    /// for every caller, authenticated or not.
    pub fn check<'a>(&self, ctx: &'a RequestContext) -> Result<&'a Identity, AppError> {
        if self.allowed.is_empty() {
            error!(path = %ctx.metadata.path, "Role guard configured with an empty role set");
            return Err(AppError::misconfigured(
                "Authorization misconfigured: roles array is empty",
            ));
        }

        let identity = require_authenticated(ctx)?;

        if !self.allowed.contains(&identity.role) {
            let names: Vec<&str> = self.allowed.iter().map(Role::as_str).collect();
            return Err(AppError::forbidden(format!(
                "Requires role in [{}]",
                names.join(", ")
            )));
        }

        Ok(identity)
    }
}
