//! User record as exposed by the user store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::role::Role;

/// A registered user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Unique user identifier.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Assigned role.
    pub role: Role,
    /// Password hash.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Partial update applied to an existing user.
///
/// `password` is a plaintext value on input and is replaced by its hash
/// before the patch reaches the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserPatch {
    /// New display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// New role.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// New password.
    #[serde(default, skip_serializing)]
    pub password: Option<String>,
}

impl UserPatch {
    /// Whether applying the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none() && self.password.is_none()
    }

    /// Whether the patch touches the role field.
    pub fn changes_role(&self) -> bool {
        self.role.is_some()
    }
}
