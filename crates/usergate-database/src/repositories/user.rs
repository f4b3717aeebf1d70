//! PostgreSQL user repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use usergate_core::error::{AppError, ErrorKind};
use usergate_core::result::AppResult;
use usergate_entity::user::{Role, UserPatch, UserRecord};

use crate::store::{NewUser, UserStore};

const USER_COLUMNS: &str = "id, name, email, role, password_hash, created_at, updated_at";

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    name: String,
    email: String,
    role: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(|_| {
            AppError::storage(format!("User {} has unrecognised role '{}'", row.id, row.role))
        })?;
        Ok(UserRecord {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Maps sqlx errors, turning unique violations into `Conflict`.
fn map_db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        if let sqlx::Error::Database(db) = &e {
            if db.is_unique_violation() {
                return AppError::conflict("Email already exists");
            }
        }
        AppError::with_source(ErrorKind::Storage, context, e)
    }
}

/// User store backed by the `users` table.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    /// Create a new user repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error("Failed to list users"))?;

        rows.into_iter().map(UserRecord::try_from).collect()
    }

    async fn get_user_by_id(&self, id: i64) -> AppResult<UserRecord> {
        sqlx::query_as::<_, UserRow>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error("Failed to find user by id"))?
            .ok_or_else(|| AppError::not_found("User not found"))?
            .try_into()
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error("Failed to find user by email"))?
        .map(UserRecord::try_from)
        .transpose()
    }

    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, role, password_hash) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.role.as_str())
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error("Failed to create user"))?
        .try_into()
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> AppResult<UserRecord> {
        if patch.is_empty() {
            return self.get_user_by_id(id).await;
        }

        sqlx::query_as::<_, UserRow>(&format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                email = COALESCE($3, email), \
                role = COALESCE($4, role), \
                password_hash = COALESCE($5, password_hash), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(patch.name.as_deref())
        .bind(patch.email.as_deref())
        .bind(patch.role.map(|r| r.as_str()))
        .bind(patch.password.as_deref())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error("Failed to update user"))?
        .ok_or_else(|| AppError::not_found("User not found"))?
        .try_into()
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_db_error("Failed to delete user"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }
}
