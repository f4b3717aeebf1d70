//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use usergate_admission::AdmissionControl;
use usergate_auth::{IdentityAttacher, PasswordHasher, TokenCodec};
use usergate_core::config::AppConfig;
use usergate_database::UserStore;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,

    // ── Auth ─────────────────────────────────────────────────
    /// Token signer and verifier
    pub codec: Arc<TokenCodec>,
    /// Per-request identity attachment
    pub attacher: Arc<IdentityAttacher>,
    /// Password hasher (Argon2)
    pub password_hasher: Arc<PasswordHasher>,

    // ── Admission ────────────────────────────────────────────
    /// Bot, shield, and rate limit decisions
    pub admission: Arc<AdmissionControl>,

    // ── Collaborators ────────────────────────────────────────
    /// User store
    pub users: Arc<dyn UserStore>,
}

impl AppState {
    /// Wires the auth components from configuration around the given
    /// store and admission control.
    pub fn new(
        config: AppConfig,
        users: Arc<dyn UserStore>,
        admission: Arc<AdmissionControl>,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(&config.auth));
        let attacher = Arc::new(IdentityAttacher::new(Arc::clone(&codec), &config.auth));

        Self {
            config: Arc::new(config),
            codec,
            attacher,
            password_hasher: Arc::new(PasswordHasher::new()),
            admission,
            users,
        }
    }
}
