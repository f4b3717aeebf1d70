//! Context and identity extractors.
//!
//! Both read the [`RequestContext`] the identity middleware inserted into
//! the request extensions; neither verifies credentials itself.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use usergate_auth::RequestContext;
use usergate_auth::gate::require_authenticated;
use usergate_core::error::AppError;
use usergate_entity::Identity;

use crate::error::ApiError;

/// The per-request context.
#[derive(Debug, Clone)]
pub struct Ctx(pub RequestContext);

impl<S: Send + Sync> FromRequestParts<S> for Ctx {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .map(Ctx)
            .ok_or_else(|| AppError::internal("Request context missing").into())
    }
}

/// The attached identity; rejects anonymous callers with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

impl std::ops::Deref for AuthUser {
    type Target = Identity;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Send + Sync> FromRequestParts<S> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ctx(ctx) = Ctx::from_request_parts(parts, state).await?;
        let identity = require_authenticated(&ctx)?.clone();
        Ok(AuthUser(identity))
    }
}
