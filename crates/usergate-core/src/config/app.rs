//! Listener and CORS settings.

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Where and how the HTTP listener runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Trust the left-most `X-Forwarded-For` hop as the client address.
    /// Only enable behind a proxy that overwrites the header.
    #[serde(default)]
    pub trust_proxy: bool,
    /// How long in-flight requests may drain after Ctrl+C.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    #[serde(default)]
    pub cors: CorsConfig,
}

impl ServerConfig {
    /// Parses `host:port` into a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        let ip: IpAddr = self.host.parse().map_err(|_| {
            AppError::misconfigured(format!("server.host '{}' is not an IP address", self.host))
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            trust_proxy: false,
            shutdown_grace_seconds: default_shutdown_grace(),
            cors: CorsConfig::default(),
        }
    }
}

/// Browser origins allowed to call the API.
///
/// The session cookie is only sent cross-origin when credentials are
/// allowed, which in turn requires an explicit origin list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Exact origins, e.g. `https://app.example.com`. Empty means any origin
    /// without credentials.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Preflight cache lifetime in seconds; 0 leaves it unset.
    #[serde(default)]
    pub preflight_max_age_seconds: u64,
}

impl CorsConfig {
    /// Whether credentialed cross-origin requests are possible.
    pub fn allows_credentials(&self) -> bool {
        !self.allowed_origins.is_empty()
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_grace() -> u64 {
    30
}
