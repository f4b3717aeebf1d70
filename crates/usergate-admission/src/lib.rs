//! # usergate-admission
//!
//! Admission control for UserGate. Combines an external bot/shield
//! evaluator with a per-role sliding-window rate counter into a single
//! allow/deny [`Decision`].

pub mod clock;
pub mod control;
pub mod decision;
pub mod evaluator;
pub mod policy;
pub mod window;

pub use clock::{Clock, ManualClock, SystemClock};
pub use control::AdmissionControl;
pub use decision::{Decision, ReasonKind};
pub use evaluator::{
    DenialReason, HttpEvaluator, NoopEvaluator, SecurityEvaluator, StaticEvaluator, Verdict,
};
pub use policy::{RoleLimit, RoleLimitPolicy};
pub use window::{BucketKey, SlidingWindowStore, WindowOutcome};
