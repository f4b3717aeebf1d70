//! Admission decision: evaluator verdict first, local rate window second.

use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use usergate_core::config::{AdmissionConfig, ClientKeyStrategy, EvaluatorProvider, RuleMode};
use usergate_core::error::AppError;
use usergate_core::result::AppResult;
use usergate_core::types::RequestMetadata;
use usergate_entity::Role;

use crate::clock::Clock;
use crate::decision::{Decision, ReasonKind};
use crate::evaluator::{DenialReason, HttpEvaluator, NoopEvaluator, SecurityEvaluator, Verdict};
use crate::policy::RoleLimitPolicy;
use crate::window::{BucketKey, SlidingWindowStore, WindowOutcome};

const BOT_MESSAGE: &str = "Automated requests are not allowed";
const SHIELD_MESSAGE: &str = "Request blocked by security policy";
const UNKNOWN_MESSAGE: &str = "Request denied";

/// Combines bot detection, shield rules, and per-role rate limiting.
pub struct AdmissionControl {
    enabled: bool,
    policy: RoleLimitPolicy,
    windows: SlidingWindowStore,
    evaluator: Arc<dyn SecurityEvaluator>,
    timeout: Duration,
    bot_mode: RuleMode,
    shield_mode: RuleMode,
    client_key: ClientKeyStrategy,
}

impl std::fmt::Debug for AdmissionControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionControl")
            .field("enabled", &self.enabled)
            .field("policy", &self.policy)
            .field("buckets", &self.windows.len())
            .field("timeout", &self.timeout)
            .field("bot_mode", &self.bot_mode)
            .field("shield_mode", &self.shield_mode)
            .field("client_key", &self.client_key)
            .finish()
    }
}

impl AdmissionControl {
    /// Creates admission control with an explicit evaluator and clock.
    ///
    /// Fails with `Misconfigured` when the limit table is invalid.
    pub fn new(
        config: &AdmissionConfig,
        evaluator: Arc<dyn SecurityEvaluator>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, AppError> {
        let policy = RoleLimitPolicy::from_config(&config.limits)?;
        if config.evaluator.timeout_ms == 0 {
            return Err(AppError::misconfigured(
                "admission.evaluator.timeout_ms must be positive",
            ));
        }

        Ok(Self {
            enabled: config.enabled,
            policy,
            windows: SlidingWindowStore::new(clock),
            evaluator,
            timeout: Duration::from_millis(config.evaluator.timeout_ms),
            bot_mode: config.evaluator.bot_mode,
            shield_mode: config.evaluator.shield_mode,
            client_key: config.client_key,
        })
    }

    /// Creates admission control with the evaluator selected by configuration.
    pub fn from_config(config: &AdmissionConfig, clock: Arc<dyn Clock>) -> Result<Self, AppError> {
        let evaluator: Arc<dyn SecurityEvaluator> = match config.evaluator.provider {
            EvaluatorProvider::None => Arc::new(NoopEvaluator),
            EvaluatorProvider::Http => Arc::new(HttpEvaluator::new(&config.evaluator)?),
        };
        Self::new(config, evaluator, clock)
    }

    /// Decides whether a request from `role` may proceed.
    ///
    /// `subject` is the attached identity's id, used by the `subject` client
    /// key strategy. Evaluator failure or timeout is an `Evaluator` error;
    /// the request is never admitted on that path.
    pub async fn admit(
        &self,
        role: Role,
        metadata: &RequestMetadata,
        subject: Option<i64>,
    ) -> AppResult<Decision> {
        if !self.enabled {
            return Ok(Decision::allow());
        }

        let limit = self.policy.limit_for(role)?;

        let verdict = tokio::time::timeout(self.timeout, self.evaluator.evaluate(metadata))
            .await
            .map_err(|_| {
                AppError::evaluator(format!(
                    "Evaluator timed out after {}ms",
                    self.timeout.as_millis()
                ))
            })??;

        if let Some(reason) = self.classify(verdict, role, metadata) {
            let detail = match reason {
                ReasonKind::Bot => BOT_MESSAGE.to_string(),
                ReasonKind::Shield => SHIELD_MESSAGE.to_string(),
                ReasonKind::RateLimit => limit.message.clone(),
                ReasonKind::Unknown | ReasonKind::None => UNKNOWN_MESSAGE.to_string(),
            };
            return Ok(Decision::deny(reason, detail));
        }

        let key = BucketKey::new(role, self.client_key(metadata, subject));
        match self.windows.check_and_record(key, limit).await {
            WindowOutcome::Admitted { remaining } => {
                debug!(role = %role, path = %metadata.path, remaining, "Request admitted");
                Ok(Decision::allow())
            }
            WindowOutcome::Exceeded { retry_after } => {
                debug!(
                    role = %role,
                    limit = limit.max_requests,
                    retry_after_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX),
                    "Rate window full"
                );
                Ok(Decision::deny(ReasonKind::RateLimit, limit.message.clone()))
            }
        }
    }

    /// Removes idle rate windows.
    pub fn sweep(&self) -> usize {
        self.windows.sweep(&self.policy)
    }

    /// Number of live rate windows.
    pub fn tracked_windows(&self) -> usize {
        self.windows.len()
    }

    /// Runs [`Self::sweep`] on a fixed interval until the control is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(control) = weak.upgrade() else {
                    break;
                };
                control.sweep();
            }
            debug!("Rate window sweeper stopped");
        })
    }

    /// Applies rule modes and precedence to a raw verdict.
    fn classify(&self, verdict: Verdict, role: Role, metadata: &RequestMetadata) -> Option<ReasonKind> {
        if !verdict.denied {
            return None;
        }

        let mut suppressed = false;
        let mut winner: Option<ReasonKind> = None;

        for reason in verdict.reasons {
            let (kind, mode) = match reason {
                DenialReason::Bot => (ReasonKind::Bot, self.bot_mode),
                DenialReason::Shield => (ReasonKind::Shield, self.shield_mode),
                DenialReason::RateLimit => (ReasonKind::RateLimit, RuleMode::Live),
                DenialReason::Other => (ReasonKind::Unknown, RuleMode::Live),
            };
            if mode == RuleMode::DryRun {
                info!(
                    reason = %kind,
                    role = %role,
                    path = %metadata.path,
                    method = %metadata.method,
                    client = %metadata.redacted_client(),
                    "Dry-run rule would deny request"
                );
                suppressed = true;
                continue;
            }
            if winner.is_none_or(|w| kind.precedence() > w.precedence()) {
                winner = Some(kind);
            }
        }

        match winner {
            Some(kind) => Some(kind),
            None if suppressed => None,
            None => Some(ReasonKind::Unknown),
        }
    }

    fn client_key(&self, metadata: &RequestMetadata, subject: Option<i64>) -> String {
        match (self.client_key, subject) {
            (ClientKeyStrategy::Subject, Some(id)) => format!("subject:{id}"),
            _ => format!("ip:{}", metadata.ip),
        }
    }
}
