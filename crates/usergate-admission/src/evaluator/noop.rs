//! Evaluator that allows everything.

use async_trait::async_trait;

use usergate_core::result::AppResult;
use usergate_core::types::RequestMetadata;

use super::{SecurityEvaluator, Verdict};

/// Used when no evaluator provider is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEvaluator;

#[async_trait]
impl SecurityEvaluator for NoopEvaluator {
    async fn evaluate(&self, _metadata: &RequestMetadata) -> AppResult<Verdict> {
        Ok(Verdict::allow())
    }
}
