//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! TOML files overlaid with `USERGATE__` environment variables. Each
//! sub-module represents a logical configuration section.

pub mod admission;
pub mod app;
pub mod auth;
pub mod database;
pub mod logging;

use serde::{Deserialize, Serialize};

pub use self::admission::{
    AdmissionConfig, ClientKeyStrategy, EvaluatorConfig, EvaluatorProvider, RoleLimitConfig,
    RuleMode,
};
pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::{AttachMode, AuthConfig, BootstrapAdmin};
pub use self::database::DatabaseConfig;
pub use self::logging::{LogFormat, LoggingConfig};

use crate::error::AppError;

/// Placeholder secret shipped in `config/default.toml`.
pub const DEFAULT_TOKEN_SECRET: &str = "CHANGE_ME_IN_PRODUCTION";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token and credential settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Admission control settings.
    #[serde(default)]
    pub admission: AdmissionConfig,
    /// User store settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default`, an environment-specific overlay
    /// `config/{env}`, and environment variables prefixed with `USERGATE__`
    /// (e.g. `USERGATE__AUTH__TOKEN_SECRET`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("USERGATE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::misconfigured(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::misconfigured(format!("Failed to deserialize config: {e}")))
    }

    /// Rejects configurations that must never reach a running server.
    pub fn validate(&self, env: &str) -> Result<(), AppError> {
        if self.auth.token_secret.is_empty() {
            return Err(AppError::misconfigured("auth.token_secret must not be empty"));
        }
        if env != "development" && env != "test" && self.auth.token_secret == DEFAULT_TOKEN_SECRET
        {
            return Err(AppError::misconfigured(format!(
                "auth.token_secret still has the default value in '{env}'"
            )));
        }
        if self.auth.token_ttl_minutes == 0 {
            return Err(AppError::misconfigured("auth.token_ttl_minutes must be positive"));
        }
        if self.auth.cookie_name.is_empty() {
            return Err(AppError::misconfigured("auth.cookie_name must not be empty"));
        }
        if let Some(admin) = &self.auth.bootstrap_admin {
            if admin.email.is_empty() || admin.password.is_empty() {
                return Err(AppError::misconfigured(
                    "auth.bootstrap_admin requires email and password",
                ));
            }
        }
        if self.admission.evaluator.provider == EvaluatorProvider::Http
            && self.admission.evaluator.endpoint.is_empty()
        {
            return Err(AppError::misconfigured(
                "admission.evaluator.endpoint is required for the http provider",
            ));
        }
        Ok(())
    }
}
