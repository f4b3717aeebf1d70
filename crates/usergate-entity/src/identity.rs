//! Identity resolved from a verified credential.

use serde::{Deserialize, Serialize};

use crate::user::Role;

/// The caller's identity for the lifetime of one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User id the credential was issued to.
    pub subject_id: i64,
    /// Email at the time of issuance.
    pub email: String,
    /// Role at the time of issuance.
    pub role: Role,
}

impl Identity {
    /// Creates a new identity.
    pub fn new(subject_id: i64, email: impl Into<String>, role: Role) -> Self {
        Self {
            subject_id,
            email: email.into(),
            role,
        }
    }

    /// Returns whether the identity holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}
