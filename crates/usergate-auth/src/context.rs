//! Request context carrying request metadata and the attached identity.

use serde::{Deserialize, Serialize};

use usergate_core::types::RequestMetadata;
use usergate_entity::{Identity, Role};

/// Where an attached credential was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialSource {
    /// The session cookie.
    Cookie,
    /// An `Authorization: Bearer` header.
    Header,
}

/// Context for the current request.
///
/// Created by the identity stage and passed by value through every later
/// stage, so each stage sees exactly what the previous one produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// Transport metadata for the request.
    pub metadata: RequestMetadata,
    identity: Option<Identity>,
    source: Option<CredentialSource>,
    attach_failure: Option<String>,
}

impl RequestContext {
    /// Creates an anonymous context.
    pub fn new(metadata: RequestMetadata) -> Self {
        Self {
            metadata,
            identity: None,
            source: None,
            attach_failure: None,
        }
    }

    /// Returns the context with the given identity attached.
    pub fn with_identity(mut self, identity: Identity, source: CredentialSource) -> Self {
        self.identity = Some(identity);
        self.source = Some(source);
        self.attach_failure = None;
        self
    }

    /// Returns the context with a credential failure recorded and no identity.
    pub fn with_attach_failure(mut self, reason: impl Into<String>) -> Self {
        self.identity = None;
        self.source = None;
        self.attach_failure = Some(reason.into());
        self
    }

    /// The attached identity, if any.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Where the attached credential came from.
    pub fn credential_source(&self) -> Option<CredentialSource> {
        self.source
    }

    /// Why a presented credential was not attached.
    pub fn attach_failure(&self) -> Option<&str> {
        self.attach_failure.as_deref()
    }

    /// The caller's role; `Guest` when anonymous.
    pub fn role(&self) -> Role {
        self.identity.as_ref().map(|i| i.role).unwrap_or(Role::Guest)
    }

    /// Whether an identity is attached.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}
