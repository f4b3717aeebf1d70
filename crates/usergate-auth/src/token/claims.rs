//! Claims embedded in every identity token.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use usergate_entity::{Identity, Role};

/// Token claims payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: the user ID.
    pub sub: i64,
    /// Email at the time of issuance.
    pub email: String,
    /// Role at the time of issuance. Unknown role names fail deserialization.
    pub role: Role,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Unique token ID.
    pub jti: Uuid,
}

impl TokenClaims {
    /// Builds claims for an identity valid from `issued_at` until `expires_at`.
    pub fn for_identity(
        identity: &Identity,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: identity.subject_id,
            email: identity.email.clone(),
            role: identity.role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::new_v4(),
        }
    }

    /// Returns the identity carried by these claims.
    pub fn identity(&self) -> Identity {
        Identity::new(self.sub, self.email.clone(), self.role)
    }
}
