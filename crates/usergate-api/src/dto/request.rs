//! Request DTOs.

use serde::{Deserialize, Serialize};

use usergate_core::error::AppError;
use usergate_entity::{Role, UserPatch};

/// Sign-in request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInRequest {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Partial user update. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    /// New display name.
    pub name: Option<String>,
    /// New email.
    pub email: Option<String>,
    /// New role (admins only).
    pub role: Option<Role>,
    /// New plaintext password.
    pub password: Option<String>,
}

/// Rejects `guest`, which only describes anonymous callers.
impl TryFrom<UpdateUserRequest> for UserPatch {
    type Error = AppError;

    fn try_from(req: UpdateUserRequest) -> Result<Self, Self::Error> {
        if req.role == Some(Role::Guest) {
            return Err(AppError::validation(
                "Role 'guest' cannot be assigned to a user",
            ));
        }
        Ok(UserPatch {
            name: req.name,
            email: req.email,
            role: req.role,
            password: req.password,
        })
    }
}
