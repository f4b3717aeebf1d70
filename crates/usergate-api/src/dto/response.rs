//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use usergate_entity::{Identity, Role, UserRecord};

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    /// User id.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Role.
    pub role: Role,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Message-only response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable message.
    pub message: String,
}

impl MessageResponse {
    /// Creates a message response.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Single-user response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserEnvelope {
    /// Human-readable message.
    pub message: String,
    /// The user.
    pub user: UserResponse,
}

/// User listing response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserListResponse {
    /// Human-readable message.
    pub message: String,
    /// All users.
    pub users: Vec<UserResponse>,
    /// Number of users returned.
    pub count: usize,
}

/// Sign-in response. The credential itself travels in the cookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignInResponse {
    /// Human-readable message.
    pub message: String,
    /// The signed-in user.
    pub user: UserResponse,
    /// Credential expiry.
    pub expires_at: DateTime<Utc>,
}

/// Current identity response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeResponse {
    /// The attached identity.
    pub user: Identity,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Crate version.
    pub version: String,
}
