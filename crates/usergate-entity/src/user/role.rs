//! Caller role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles recognised by the authorization and admission layers.
///
/// `Guest` is never stored on a user; it is the role of an unauthenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Unauthenticated caller.
    Guest,
    /// Regular account holder.
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Every role, in ascending privilege order.
    pub const ALL: [Role; 3] = [Role::Guest, Role::User, Role::Admin];

    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Guest => "guest",
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = usergate_core::AppError;

    /// Parses an exact lowercase role name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "guest" => Ok(Self::Guest),
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            _ => Err(usergate_core::AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: guest, user, admin"
            ))),
        }
    }
}
