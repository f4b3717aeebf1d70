//! Admission control configuration: per-role limits and the external
//! bot/shield evaluator.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Which request characteristic identifies a client for rate counting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientKeyStrategy {
    /// Source IP address.
    #[default]
    Ip,
    /// Subject id of the attached identity, falling back to the source IP.
    Subject,
}

/// Enforcement mode of an evaluator rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleMode {
    /// Denials are enforced.
    #[default]
    Live,
    /// Denials are logged and ignored.
    DryRun,
}

/// Backend used for bot and shield evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorProvider {
    /// No external evaluation; every request passes to the rate counter.
    #[default]
    None,
    /// JSON-over-HTTP evaluator service.
    Http,
}

/// Rate limit applied to a single role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleLimitConfig {
    /// Length of the sliding window in seconds.
    pub window_seconds: u64,
    /// Maximum requests admitted within one window.
    pub max_requests: u32,
    /// Message returned to the caller when the limit is exceeded.
    pub message: String,
}

/// External evaluator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    /// Evaluator backend.
    #[serde(default)]
    pub provider: EvaluatorProvider,
    /// Decision endpoint URL (http provider only).
    #[serde(default)]
    pub endpoint: String,
    /// API key sent as a bearer token to the evaluator.
    #[serde(default)]
    pub api_key: String,
    /// Upper bound on a single evaluation call.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Enforcement mode of the shield rule.
    #[serde(default)]
    pub shield_mode: RuleMode,
    /// Enforcement mode of the bot-detection rule.
    #[serde(default = "default_bot_mode")]
    pub bot_mode: RuleMode,
    /// Bot categories the evaluator should let through.
    #[serde(default = "default_allowed_bot_categories")]
    pub allowed_bot_categories: Vec<String>,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            provider: EvaluatorProvider::default(),
            endpoint: String::new(),
            api_key: String::new(),
            timeout_ms: default_timeout_ms(),
            shield_mode: RuleMode::Live,
            bot_mode: default_bot_mode(),
            allowed_bot_categories: default_allowed_bot_categories(),
        }
    }
}

/// Admission control configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdmissionConfig {
    /// Whether admission control runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How clients are identified for rate counting.
    #[serde(default)]
    pub client_key: ClientKeyStrategy,
    /// Interval between sweeps of idle rate windows.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Role name → limit. Every role must have exactly one entry.
    #[serde(default = "default_limits")]
    pub limits: HashMap<String, RoleLimitConfig>,
    /// External evaluator.
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            client_key: ClientKeyStrategy::default(),
            sweep_interval_seconds: default_sweep_interval(),
            limits: default_limits(),
            evaluator: EvaluatorConfig::default(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_timeout_ms() -> u64 {
    1500
}

fn default_bot_mode() -> RuleMode {
    RuleMode::DryRun
}

fn default_allowed_bot_categories() -> Vec<String> {
    vec![
        "CATEGORY:SEARCH_ENGINE".to_string(),
        "CATEGORY:PREVIEW".to_string(),
    ]
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_limits() -> HashMap<String, RoleLimitConfig> {
    [
        ("admin", 20, "Admin request limit exceeded (20/min)."),
        ("user", 10, "User request limit exceeded (10/min)."),
        ("guest", 5, "Guest request limit exceeded (5/min)."),
    ]
    .into_iter()
    .map(|(role, max, message)| {
        (
            role.to_string(),
            RoleLimitConfig {
                window_seconds: 60,
                max_requests: max,
                message: message.to_string(),
            },
        )
    })
    .collect()
}
