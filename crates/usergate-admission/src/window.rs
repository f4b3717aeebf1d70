//! Sliding-window request log keyed by role and client.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use usergate_entity::Role;

use crate::clock::Clock;
use crate::policy::{RoleLimit, RoleLimitPolicy};

/// Identifies one rate bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// Role the limit is drawn from.
    pub role: Role,
    /// Client identifier (IP or subject id).
    pub client: String,
}

impl BucketKey {
    /// Creates a bucket key.
    pub fn new(role: Role, client: impl Into<String>) -> Self {
        Self {
            role,
            client: client.into(),
        }
    }
}

/// Admission instants within the trailing window, oldest first.
#[derive(Debug, Default)]
struct WindowLog {
    hits: VecDeque<Instant>,
}

impl WindowLog {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.hits.front() {
            if now.saturating_duration_since(oldest) >= window {
                self.hits.pop_front();
            } else {
                break;
            }
        }
    }
}

/// Result of a check-and-record against one bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowOutcome {
    /// The request was recorded.
    Admitted {
        /// Requests still available in the current window.
        remaining: u32,
    },
    /// The bucket is full; nothing was recorded.
    Exceeded {
        /// Time until the oldest recorded request leaves the window.
        retry_after: Duration,
    },
}

/// Keyed store of rate windows.
///
/// The map shard lock is held only while fetching the bucket handle; the
/// per-bucket mutex serializes check-and-record.
#[derive(Debug)]
pub struct SlidingWindowStore {
    buckets: DashMap<BucketKey, Arc<Mutex<WindowLog>>>,
    clock: Arc<dyn Clock>,
}

impl SlidingWindowStore {
    /// Creates an empty store reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            buckets: DashMap::new(),
            clock,
        }
    }

    /// Prunes the bucket, then records the request unless the limit is reached.
    pub async fn check_and_record(&self, key: BucketKey, limit: &RoleLimit) -> WindowOutcome {
        let bucket = self.bucket(key);
        let mut log = bucket.lock().await;

        let now = self.clock.now();
        log.prune(now, limit.window);

        let used = u32::try_from(log.hits.len()).unwrap_or(u32::MAX);
        if used >= limit.max_requests {
            let retry_after = log
                .hits
                .front()
                .map(|oldest| limit.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or_default();
            return WindowOutcome::Exceeded { retry_after };
        }

        log.hits.push_back(now);
        WindowOutcome::Admitted {
            remaining: limit.max_requests - used - 1,
        }
    }

    /// Fetches the bucket handle. Existing buckets only take the shard read
    /// lock; the write lock is taken on a miss.
    fn bucket(&self, key: BucketKey) -> Arc<Mutex<WindowLog>> {
        if let Some(existing) = self.buckets.get(&key) {
            return Arc::clone(existing.value());
        }
        Arc::clone(self.buckets.entry(key).or_default().value())
    }

    /// Removes buckets that are idle: no request holds the handle and the
    /// log is empty after pruning. Returns the number removed.
    pub fn sweep(&self, policy: &RoleLimitPolicy) -> usize {
        let now = self.clock.now();
        let before = self.buckets.len();

        self.buckets.retain(|key, bucket| {
            if Arc::strong_count(bucket) > 1 {
                return true;
            }
            let Ok(window) = policy.limit_for(key.role).map(|l| l.window) else {
                return true;
            };
            match bucket.try_lock() {
                Ok(mut log) => {
                    log.prune(now, window);
                    !log.hits.is_empty()
                }
                Err(_) => true,
            }
        });

        let removed = before.saturating_sub(self.buckets.len());
        if removed > 0 {
            debug!(removed, remaining = self.buckets.len(), "Swept idle rate windows");
        }
        removed
    }

    /// Number of live buckets.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Whether the store holds no buckets.
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}
