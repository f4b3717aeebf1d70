//! Per-role rate limit table, validated once at startup.

use std::collections::HashMap;
use std::time::Duration;

use usergate_core::config::RoleLimitConfig;
use usergate_core::error::AppError;
use usergate_entity::Role;

/// Limit applied to one role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleLimit {
    /// Sliding window length.
    pub window: Duration,
    /// Requests admitted per window.
    pub max_requests: u32,
    /// Message returned to a throttled caller.
    pub message: String,
}

/// Read-only mapping of every role to its limit.
#[derive(Debug, Clone)]
pub struct RoleLimitPolicy {
    limits: HashMap<Role, RoleLimit>,
}

impl RoleLimitPolicy {
    /// Builds the policy from the configured table.
    ///
    /// Every role must have exactly one entry with a positive window and
    /// maximum; unknown role names are rejected.
    pub fn from_config(table: &HashMap<String, RoleLimitConfig>) -> Result<Self, AppError> {
        let mut limits = HashMap::with_capacity(table.len());

        for (name, entry) in table {
            let role: Role = name.parse().map_err(|_| {
                AppError::misconfigured(format!("Rate limit entry for unknown role '{name}'"))
            })?;
            if entry.window_seconds == 0 {
                return Err(AppError::misconfigured(format!(
                    "Rate limit window for role '{name}' must be positive"
                )));
            }
            if entry.max_requests == 0 {
                return Err(AppError::misconfigured(format!(
                    "Rate limit maximum for role '{name}' must be positive"
                )));
            }
            limits.insert(
                role,
                RoleLimit {
                    window: Duration::from_secs(entry.window_seconds),
                    max_requests: entry.max_requests,
                    message: entry.message.clone(),
                },
            );
        }

        if let Some(missing) = Role::ALL.iter().find(|r| !limits.contains_key(*r)) {
            return Err(AppError::misconfigured(format!(
                "Missing rate limit entry for role '{missing}'"
            )));
        }

        Ok(Self { limits })
    }

    /// Limit for `role`.
    pub fn limit_for(&self, role: Role) -> Result<&RoleLimit, AppError> {
        self.limits.get(&role).ok_or_else(|| {
            AppError::misconfigured(format!("Missing rate limit entry for role '{role}'"))
        })
    }
}
