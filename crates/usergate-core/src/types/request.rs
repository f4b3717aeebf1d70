//! Transport-independent description of an inbound request.

use serde::{Deserialize, Serialize};

/// Metadata consumed by admission control and the external evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Source IP address, or `"unknown"` when it cannot be determined.
    pub ip: String,
    /// HTTP method.
    pub method: String,
    /// Request path (no query string).
    pub path: String,
    /// `User-Agent` header value.
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    /// Creates request metadata.
    pub fn new(
        ip: impl Into<String>,
        method: impl Into<String>,
        path: impl Into<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            ip: ip.into(),
            method: method.into(),
            path: path.into(),
            user_agent,
        }
    }

    /// Client identifier that is safe to write to logs.
    pub fn redacted_client(&self) -> String {
        super::redact::redact_client(&self.ip)
    }
}
