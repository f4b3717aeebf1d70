//! In-memory user store for development and tests.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use usergate_core::error::AppError;
use usergate_core::result::AppResult;
use usergate_entity::user::{UserPatch, UserRecord};

use crate::store::{NewUser, UserStore};

#[derive(Debug, Default)]
struct InnerState {
    users: BTreeMap<i64, UserRecord>,
    next_id: i64,
}

impl InnerState {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| Some(u.id) != except && u.email.eq_ignore_ascii_case(email))
    }
}

/// User store backed by a `BTreeMap` behind a Tokio `RwLock`.
///
/// Suitable for single-node deployments without a database.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    state: Arc<RwLock<InnerState>>,
}

impl MemoryUserStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        let state = self.state.read().await;
        Ok(state.users.values().cloned().collect())
    }

    async fn get_user_by_id(&self, id: i64) -> AppResult<UserRecord> {
        let state = self.state.read().await;
        state
            .users
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        let mut state = self.state.write().await;
        if state.email_taken(&user.email, None) {
            return Err(AppError::conflict("Email already exists"));
        }

        state.next_id += 1;
        let now = Utc::now();
        let record = UserRecord {
            id: state.next_id,
            name: user.name,
            email: user.email,
            role: user.role,
            password_hash: user.password_hash,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(record.id, record.clone());
        debug!(user_id = record.id, "User created");
        Ok(record)
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> AppResult<UserRecord> {
        let mut state = self.state.write().await;
        if !state.users.contains_key(&id) {
            return Err(AppError::not_found("User not found"));
        }
        if let Some(email) = patch.email.as_deref() {
            if state.email_taken(email, Some(id)) {
                return Err(AppError::conflict("Email already exists"));
            }
        }

        let user = state
            .users
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("User not found"))?;

        if patch.is_empty() {
            return Ok(user.clone());
        }
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        if let Some(role) = patch.role {
            user.role = role;
        }
        if let Some(hash) = patch.password {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        let mut state = self.state.write().await;
        state
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
