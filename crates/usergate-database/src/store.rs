//! User store collaborator trait.

use async_trait::async_trait;

use usergate_core::result::AppResult;
use usergate_entity::user::{Role, UserPatch, UserRecord};

/// Data required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Unique email address.
    pub email: String,
    /// Assigned role.
    pub role: Role,
    /// Pre-hashed password.
    pub password_hash: String,
}

/// Data access for user records.
///
/// Lookups by id fail with `NotFound` when the user does not exist; writes
/// fail with `Conflict` on a duplicate email and `Storage` on backend errors.
/// `UserPatch::password`, when present, already holds the password hash.
#[async_trait]
pub trait UserStore: Send + Sync + 'static {
    /// Returns every user.
    async fn list_users(&self) -> AppResult<Vec<UserRecord>>;

    /// Returns the user with the given id.
    async fn get_user_by_id(&self, id: i64) -> AppResult<UserRecord>;

    /// Finds a user by email (case-insensitive).
    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>>;

    /// Creates a user.
    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord>;

    /// Applies a patch and returns the updated user.
    async fn update_user(&self, id: i64, patch: UserPatch) -> AppResult<UserRecord>;

    /// Deletes the user with the given id.
    async fn delete_user(&self, id: i64) -> AppResult<()>;
}
