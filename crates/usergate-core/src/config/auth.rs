//! Token and credential configuration.

use serde::{Deserialize, Serialize};

use super::DEFAULT_TOKEN_SECRET;

/// How the identity stage treats a credential that fails verification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachMode {
    /// Record the failure and continue as anonymous.
    #[default]
    Lenient,
    /// Reject the request with `401`.
    Blocking,
}

/// Authentication and credential configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Secret key for token signing (HMAC-SHA256).
    #[serde(default = "default_token_secret")]
    pub token_secret: String,
    /// Identifier of the active signing key, written to the token header.
    #[serde(default = "default_key_id")]
    pub token_key_id: String,
    /// Token TTL in minutes.
    #[serde(default = "default_token_ttl")]
    pub token_ttl_minutes: u64,
    /// Name of the session cookie that carries the token.
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Whether the session cookie is marked `Secure`.
    #[serde(default)]
    pub cookie_secure: bool,
    /// Whether `Authorization: Bearer` is accepted when the cookie is absent.
    #[serde(default = "default_true")]
    pub header_fallback: bool,
    /// Behaviour of the identity stage on a failed verification.
    #[serde(default)]
    pub attach_mode: AttachMode,
    /// Administrator created at startup when no account has its email.
    #[serde(default)]
    pub bootstrap_admin: Option<BootstrapAdmin>,
}

/// Initial administrator account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapAdmin {
    /// Display name.
    #[serde(default = "default_admin_name")]
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_secret: default_token_secret(),
            token_key_id: default_key_id(),
            token_ttl_minutes: default_token_ttl(),
            cookie_name: default_cookie_name(),
            cookie_secure: false,
            header_fallback: true,
            attach_mode: AttachMode::default(),
            bootstrap_admin: None,
        }
    }
}

fn default_token_secret() -> String {
    DEFAULT_TOKEN_SECRET.to_string()
}

fn default_key_id() -> String {
    "primary".to_string()
}

fn default_token_ttl() -> u64 {
    24 * 60
}

fn default_cookie_name() -> String {
    "token".to_string()
}

fn default_admin_name() -> String {
    "Administrator".to_string()
}

fn default_true() -> bool {
    true
}
