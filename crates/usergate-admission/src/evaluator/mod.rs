//! External bot and shield evaluation.
//!
//! The evaluator is a one-method capability; AdmissionControl applies rule
//! modes and precedence on top of the raw verdict.

pub mod fixed;
pub mod http;
pub mod noop;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use usergate_core::result::AppResult;
use usergate_core::types::RequestMetadata;

pub use fixed::StaticEvaluator;
pub use http::HttpEvaluator;
pub use noop::NoopEvaluator;

/// Why the evaluator denied a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DenialReason {
    /// Automated client.
    Bot,
    /// Request matched an attack signature.
    Shield,
    /// The evaluator's own rate rule tripped.
    RateLimit,
    /// Any reason this layer does not recognise.
    #[serde(other)]
    Other,
}

/// Raw evaluator result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the evaluator denied the request.
    pub denied: bool,
    /// Reasons reported with the denial, possibly empty.
    pub reasons: Vec<DenialReason>,
}

impl Verdict {
    /// An allowing verdict.
    pub fn allow() -> Self {
        Self::default()
    }

    /// A denying verdict with the given reasons.
    pub fn deny(reasons: impl IntoIterator<Item = DenialReason>) -> Self {
        Self {
            denied: true,
            reasons: reasons.into_iter().collect(),
        }
    }
}

/// Classifies a request as bot, attack, or acceptable traffic.
#[async_trait]
pub trait SecurityEvaluator: Send + Sync + 'static {
    /// Evaluates the request. Transport or protocol failures are
    /// `ErrorKind::Evaluator`.
    async fn evaluate(&self, metadata: &RequestMetadata) -> AppResult<Verdict>;
}
