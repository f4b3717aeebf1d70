//! Resource-level authorization rules layered above the route guards.
//!
//! Handlers call these before touching the user store; a rejection means
//! the store is never called.

use usergate_core::error::AppError;
use usergate_entity::{Identity, UserPatch};

/// Whether the identity may act on the resource owned by `owner_id`.
pub fn is_self_or_admin(identity: &Identity, owner_id: i64) -> bool {
    identity.is_admin() || identity.subject_id == owner_id
}

/// Reading a profile requires ownership or the admin role.
pub fn authorize_read(identity: &Identity, owner_id: i64) -> Result<(), AppError> {
    if is_self_or_admin(identity, owner_id) {
        Ok(())
    } else {
        Err(AppError::forbidden("You can only access your own profile"))
    }
}

/// Only administrators may change a role, including their own.
pub fn authorize_role_change(identity: &Identity, patch: &UserPatch) -> Result<(), AppError> {
    if patch.changes_role() && !identity.is_admin() {
        return Err(AppError::forbidden("Only admins can change roles"));
    }
    Ok(())
}

/// Updating requires ownership or the admin role, and non-admins may not
/// touch the role field.
pub fn authorize_update(
    identity: &Identity,
    owner_id: i64,
    patch: &UserPatch,
) -> Result<(), AppError> {
    if !is_self_or_admin(identity, owner_id) {
        return Err(AppError::forbidden("You can only update your own account"));
    }
    authorize_role_change(identity, patch)
}

/// Deleting users is reserved for administrators.
pub fn authorize_delete(identity: &Identity) -> Result<(), AppError> {
    if identity.is_admin() {
        Ok(())
    } else {
        Err(AppError::forbidden("Only admins can delete users"))
    }
}
