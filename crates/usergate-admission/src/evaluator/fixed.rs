//! Scriptable evaluator for tests and local runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use usergate_core::error::AppError;
use usergate_core::result::AppResult;
use usergate_core::types::RequestMetadata;

use super::{SecurityEvaluator, Verdict};

#[derive(Debug, Clone)]
enum Response {
    Verdict(Verdict),
    Fail(String),
}

/// Returns a fixed response that can be swapped at runtime.
///
/// Clones share the response and call counter.
#[derive(Debug, Clone)]
pub struct StaticEvaluator {
    response: Arc<RwLock<Response>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<AtomicUsize>,
}

impl StaticEvaluator {
    /// Evaluator that returns `verdict` for every request.
    pub fn new(verdict: Verdict) -> Self {
        Self {
            response: Arc::new(RwLock::new(Response::Verdict(verdict))),
            delay: Arc::new(RwLock::new(None)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Evaluator that allows every request.
    pub fn allowing() -> Self {
        Self::new(Verdict::allow())
    }

    /// Replaces the verdict.
    pub async fn set_verdict(&self, verdict: Verdict) {
        *self.response.write().await = Response::Verdict(verdict);
    }

    /// Makes every subsequent call fail with an evaluator error.
    pub async fn set_failure(&self, message: impl Into<String>) {
        *self.response.write().await = Response::Fail(message.into());
    }

    /// Delays every subsequent call.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.write().await = delay;
    }

    /// Number of evaluations performed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for StaticEvaluator {
    fn default() -> Self {
        Self::allowing()
    }
}

#[async_trait]
impl SecurityEvaluator for StaticEvaluator {
    async fn evaluate(&self, _metadata: &RequestMetadata) -> AppResult<Verdict> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        match &*self.response.read().await {
            Response::Verdict(v) => Ok(v.clone()),
            Response::Fail(message) => Err(AppError::evaluator(message.clone())),
        }
    }
}
