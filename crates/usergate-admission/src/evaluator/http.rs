//! JSON-over-HTTP evaluator client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use usergate_core::config::{EvaluatorConfig, RuleMode};
use usergate_core::error::{AppError, ErrorKind};
use usergate_core::result::AppResult;
use usergate_core::types::RequestMetadata;

use super::{DenialReason, SecurityEvaluator, Verdict};

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum WireMode {
    Live,
    DryRun,
}

impl From<RuleMode> for WireMode {
    fn from(mode: RuleMode) -> Self {
        match mode {
            RuleMode::Live => Self::Live,
            RuleMode::DryRun => Self::DryRun,
        }
    }
}

#[derive(Debug, Serialize)]
struct ShieldRule {
    mode: WireMode,
}

#[derive(Debug, Serialize)]
struct BotRule<'a> {
    mode: WireMode,
    allow: &'a [String],
}

#[derive(Debug, Serialize)]
struct Rules<'a> {
    shield: ShieldRule,
    detect_bot: BotRule<'a>,
}

#[derive(Debug, Serialize)]
struct EvaluateRequest<'a> {
    request: &'a RequestMetadata,
    rules: Rules<'a>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Conclusion {
    Allow,
    Deny,
    #[serde(other)]
    Error,
}

#[derive(Debug, Deserialize)]
struct WireReason {
    #[serde(rename = "type")]
    kind: DenialReason,
}

#[derive(Debug, Deserialize)]
struct EvaluateResponse {
    conclusion: Conclusion,
    #[serde(default)]
    reasons: Vec<WireReason>,
}

/// Posts request metadata and rule configuration to an evaluator service.
///
/// The call timeout is enforced by AdmissionControl.
#[derive(Debug, Clone)]
pub struct HttpEvaluator {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    shield_mode: RuleMode,
    bot_mode: RuleMode,
    allowed_bot_categories: Vec<String>,
}

impl HttpEvaluator {
    /// Creates a client from evaluator configuration.
    pub fn new(config: &EvaluatorConfig) -> Result<Self, AppError> {
        if config.endpoint.is_empty() {
            return Err(AppError::misconfigured(
                "Evaluator endpoint is required for the http provider",
            ));
        }

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Misconfigured,
                    "Failed to build evaluator client",
                    e,
                )
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            shield_mode: config.shield_mode,
            bot_mode: config.bot_mode,
            allowed_bot_categories: config.allowed_bot_categories.clone(),
        })
    }
}

#[async_trait]
impl SecurityEvaluator for HttpEvaluator {
    async fn evaluate(&self, metadata: &RequestMetadata) -> AppResult<Verdict> {
        let body = EvaluateRequest {
            request: metadata,
            rules: Rules {
                shield: ShieldRule {
                    mode: self.shield_mode.into(),
                },
                detect_bot: BotRule {
                    mode: self.bot_mode.into(),
                    allow: &self.allowed_bot_categories,
                },
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if !self.api_key.is_empty() {
            request = request.bearer_auth(&self.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Evaluator, "Evaluator request failed", e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::evaluator(format!(
                "Evaluator responded with status {status}"
            )));
        }

        let parsed: EvaluateResponse = response.json().await.map_err(|e| {
            AppError::with_source(ErrorKind::Evaluator, "Malformed evaluator response", e)
        })?;

        debug!(
            conclusion = ?parsed.conclusion,
            reasons = parsed.reasons.len(),
            "Evaluator responded"
        );

        match parsed.conclusion {
            Conclusion::Allow => Ok(Verdict::allow()),
            Conclusion::Deny => Ok(Verdict::deny(parsed.reasons.into_iter().map(|r| r.kind))),
            Conclusion::Error => Err(AppError::evaluator("Evaluator reported an error")),
        }
    }
}
