//! Admission outcome.

use serde::Serialize;

/// Typed reason attached to a denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonKind {
    /// The request was allowed.
    None,
    /// Automated client.
    Bot,
    /// Attack signature.
    Shield,
    /// Per-role rate limit.
    RateLimit,
    /// Denied for a reason this layer does not classify.
    Unknown,
}

impl ReasonKind {
    /// Rank used when several reasons are reported; highest wins.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Bot => 4,
            Self::Shield => 3,
            Self::RateLimit => 2,
            Self::Unknown => 1,
            Self::None => 0,
        }
    }

    /// Lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bot => "bot",
            Self::Shield => "shield",
            Self::RateLimit => "rate_limit",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ReasonKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One allow/deny decision, built fresh per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    /// Whether the request may proceed.
    pub allowed: bool,
    /// Reason for a denial, `None` when allowed.
    pub reason_kind: ReasonKind,
    /// Caller-facing message for a denial.
    pub detail: Option<String>,
}

impl Decision {
    /// An allowing decision.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason_kind: ReasonKind::None,
            detail: None,
        }
    }

    /// A denying decision.
    pub fn deny(reason_kind: ReasonKind, detail: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason_kind,
            detail: Some(detail.into()),
        }
    }
}
