//! Credential extraction and identity attachment.
//!
//! Attachment never terminates the pipeline on its own: a missing
//! credential leaves the context anonymous and, in the lenient profile, an
//! invalid credential is recorded on the context and the request proceeds.
//! Guards further down decide whether an anonymous caller may continue.
//! The blocking profile is enforced separately through [`IdentityAttacher::enforce`].

use std::sync::Arc;

use tracing::debug;

use usergate_core::config::{AttachMode, AuthConfig};
use usergate_core::error::AppError;

use crate::context::{CredentialSource, RequestContext};
use crate::token::TokenCodec;

/// Raw credential material read from a request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialCarrier<'a> {
    /// Value of the session cookie.
    pub cookie: Option<&'a str>,
    /// Value of the `Authorization` header.
    pub authorization: Option<&'a str>,
}

/// Resolves identities from credentials and attaches them to the request context.
#[derive(Debug, Clone)]
pub struct IdentityAttacher {
    codec: Arc<TokenCodec>,
    cookie_name: String,
    header_fallback: bool,
    mode: AttachMode,
}

impl IdentityAttacher {
    /// Creates an attacher for the deployment profile in `config`.
    pub fn new(codec: Arc<TokenCodec>, config: &AuthConfig) -> Self {
        Self {
            codec,
            cookie_name: config.cookie_name.clone(),
            header_fallback: config.header_fallback,
            mode: config.attach_mode,
        }
    }

    /// Name of the session cookie.
    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// The codec used for verification.
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Picks the credential to verify: the cookie first, then the bearer
    /// header when header fallback is enabled.
    pub fn extract<'a>(&self, carrier: &CredentialCarrier<'a>) -> Option<(&'a str, CredentialSource)> {
        if let Some(token) = carrier.cookie.map(str::trim).filter(|t| !t.is_empty()) {
            return Some((token, CredentialSource::Cookie));
        }
        if !self.header_fallback {
            return None;
        }
        carrier
            .authorization
            .and_then(bearer_token)
            .map(|token| (token, CredentialSource::Header))
    }

    /// Verifies any presented credential and returns the updated context.
    pub fn attach(&self, ctx: RequestContext, carrier: &CredentialCarrier<'_>) -> RequestContext {
        let Some((token, source)) = self.extract(carrier) else {
            return ctx;
        };

        match self.codec.verify(token) {
            Ok(identity) => {
                debug!(
                    subject_id = identity.subject_id,
                    role = %identity.role,
                    source = ?source,
                    "Identity attached"
                );
                ctx.with_identity(identity, source)
            }
            Err(e) => {
                debug!(
                    path = %ctx.metadata.path,
                    client = %ctx.metadata.redacted_client(),
                    source = ?source,
                    error = %e.message,
                    "Credential rejected; continuing as anonymous"
                );
                ctx.with_attach_failure(e.message)
            }
        }
    }

    /// Applies the blocking profile: fails when a presented credential was rejected.
    pub fn enforce(&self, ctx: &RequestContext) -> Result<(), AppError> {
        match (self.mode, ctx.attach_failure()) {
            (AttachMode::Blocking, Some(reason)) => Err(AppError::invalid_token(format!(
                "Invalid or expired authentication token: {reason}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Returns the token of a `Bearer` authorization value.
fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
