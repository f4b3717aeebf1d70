//! Shared test helpers for integration tests.

use std::io;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{HeaderMap, Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use usergate_admission::{AdmissionControl, ManualClock, StaticEvaluator};
use usergate_api::AppState;
use usergate_auth::{PasswordHasher, TokenClaims, TokenCodec};
use usergate_core::config::AppConfig;
use usergate_core::result::AppResult;
use usergate_database::{MemoryUserStore, NewUser, UserStore};
use usergate_entity::{Identity, Role, UserPatch, UserRecord};

/// Formatted log output collected on the current thread.
#[derive(Debug, Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    /// Installs a thread-local subscriber writing into a new capture.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let capture = Self::default();
        let writer = capture.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_max_level(tracing::Level::INFO)
            .with_writer(move || writer.clone())
            .finish();
        (capture, tracing::subscriber::set_default(subscriber))
    }

    /// Everything written so far.
    pub fn contents(&self) -> String {
        let buf = self.0.lock().unwrap();
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Default password for users created by [`TestApp::create_test_user`].
pub const PASSWORD: &str = "password123";

/// User store that counts every call before delegating.
#[derive(Debug, Default)]
pub struct CountingStore {
    inner: MemoryUserStore,
    calls: AtomicUsize,
}

impl CountingStore {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    /// Calls since the last reset.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Resets the call counter.
    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for CountingStore {
    async fn list_users(&self) -> AppResult<Vec<UserRecord>> {
        self.hit();
        self.inner.list_users().await
    }

    async fn get_user_by_id(&self, id: i64) -> AppResult<UserRecord> {
        self.hit();
        self.inner.get_user_by_id(id).await
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<UserRecord>> {
        self.hit();
        self.inner.find_by_email(email).await
    }

    async fn create_user(&self, user: NewUser) -> AppResult<UserRecord> {
        self.hit();
        self.inner.create_user(user).await
    }

    async fn update_user(&self, id: i64, patch: UserPatch) -> AppResult<UserRecord> {
        self.hit();
        self.inner.update_user(id, patch).await
    }

    async fn delete_user(&self, id: i64) -> AppResult<()> {
        self.hit();
        self.inner.delete_user(id).await
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// State the router was built from
    pub state: AppState,
    /// Counting user store
    pub store: Arc<CountingStore>,
    /// Clock driving the rate windows
    pub clock: ManualClock,
    /// Scriptable bot/shield evaluator
    pub evaluator: StaticEvaluator,
}

/// Configuration used by every test app: trusted proxy headers and limits
/// high enough not to interfere unless a test lowers them.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.server.trust_proxy = true;
    config.auth.token_secret = "integration-test-secret".to_string();
    for limit in config.admission.limits.values_mut() {
        limit.max_requests = 1_000;
    }
    config
}

impl TestApp {
    /// Create a new test application
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with the default per-role limits.
    pub fn with_default_limits() -> Self {
        let mut config = test_config();
        config.admission.limits = AppConfig::default().admission.limits;
        Self::with_config(config)
    }

    /// Create a test application from an explicit configuration.
    pub fn with_config(config: AppConfig) -> Self {
        let store = Arc::new(CountingStore::default());
        let clock = ManualClock::new();
        let evaluator = StaticEvaluator::allowing();

        let admission = Arc::new(
            AdmissionControl::new(
                &config.admission,
                Arc::new(evaluator.clone()),
                Arc::new(clock.clone()),
            )
            .expect("Failed to build admission control"),
        );

        let state = AppState::new(config, store.clone(), admission);
        let router = usergate_api::router::build_router(state.clone());

        Self {
            router,
            state,
            store,
            clock,
            evaluator,
        }
    }

    /// Token codec shared with the router.
    pub fn codec(&self) -> &TokenCodec {
        &self.state.codec
    }

    /// Create a test user and return their ID
    pub async fn create_test_user(&self, name: &str, role: Role) -> i64 {
        let hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");
        let user = self
            .store
            .create_user(NewUser {
                name: name.to_string(),
                email: format!("{name}@test.com"),
                role,
                password_hash: hash,
            })
            .await
            .expect("Failed to create test user");
        self.store.reset();
        user.id
    }

    /// Issue a valid token without going through sign-in.
    pub fn token_for(&self, id: i64, role: Role) -> String {
        let identity = Identity::new(id, format!("user{id}@test.com"), role);
        self.codec()
            .issue(&identity, Duration::from_secs(600))
            .expect("Failed to issue token")
            .token
    }

    /// Issue a token that expired a minute ago.
    pub fn expired_token_for(&self, id: i64, role: Role) -> String {
        let identity = Identity::new(id, format!("user{id}@test.com"), role);
        let now = chrono::Utc::now();
        let claims = TokenClaims::for_identity(
            &identity,
            now - chrono::Duration::minutes(10),
            now - chrono::Duration::minutes(1),
        );
        self.codec()
            .encode_claims(&claims)
            .expect("Failed to encode token")
    }

    /// Make an HTTP request carrying `token` in the session cookie.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let headers: Vec<(&str, String)> = token
            .map(|t| vec![("Cookie", format!("token={t}"))])
            .unwrap_or_default();
        self.request_with_headers(method, path, body, &headers).await
    }

    /// Make an HTTP request carrying `token` as a bearer credential.
    pub async fn request_bearer(&self, method: &str, path: &str, token: &str) -> TestResponse {
        self.request_with_headers(
            method,
            path,
            None,
            &[("Authorization", format!("Bearer {token}"))],
        )
        .await
    }

    /// Make an HTTP request with arbitrary extra headers.
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, String)],
    ) -> TestResponse {
        send(&self.router, method, path, body, headers).await
    }
}

/// Sends one request through `router`.
pub async fn send(
    router: &Router,
    method: &str,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, String)],
) -> TestResponse {
    let body_str = body
        .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
        .unwrap_or_default();

    let mut req = Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/json");

    for (name, value) in headers {
        req = req.header(*name, value.as_str());
    }

    let req = req
        .body(Body::from(body_str))
        .expect("Failed to build request");

    let response = router
        .clone()
        .oneshot(req)
        .await
        .expect("Failed to send request");

    let status = response.status();
    let headers = response.headers().clone();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse {
        status,
        headers,
        body,
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of an error body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }

    /// The `message` of the body.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }

    /// The `Set-Cookie` header, if present.
    pub fn set_cookie(&self) -> Option<&str> {
        self.headers
            .get(http::header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
    }
}
