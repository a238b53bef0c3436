// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Sliding-window rate limiter keyed by arbitrary strings.
//!
//! Each key keeps the admission timestamps that fall inside the trailing
//! window. A call trims expired timestamps, then admits and records `now`
//! only while the trimmed count is below the limit. Trim, check and record
//! run under one write lock, so concurrent callers on a key can never be
//! admitted past the limit.
//!
//! State is in-memory only and resets on restart. A key is only dropped
//! once its last admission has left its window, so eviction never hands
//! out a fresh budget. `cleanup` also waits for the stale horizon. The key
//! map is bounded by `max_tracked_keys`: when it is full and nothing has
//! expired, new keys are rejected.

use crate::config::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining requests in current window
        remaining: u32,
        /// Time until the oldest admission leaves the window
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until a slot frees up
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Admission timestamps for one key, with the window they were checked against.
#[derive(Debug, Default)]
struct Window {
    admissions: VecDeque<Instant>,
    window: Duration,
}

impl Window {
    /// Drop timestamps older than `now - window`.
    fn trim(&mut self, now: Instant) {
        while let Some(oldest) = self.admissions.front() {
            if now.duration_since(*oldest) > self.window {
                self.admissions.pop_front();
            } else {
                break;
            }
        }
    }

    fn last_seen(&self) -> Option<Instant> {
        self.admissions.back().copied()
    }

    /// When the last admission leaves the window. Past this point dropping
    /// the key cannot change any future decision.
    fn expires_at(&self) -> Option<Instant> {
        self.last_seen().map(|seen| seen + self.window)
    }

    /// No admission is still inside the window and the key has been idle
    /// for at least `idle`.
    fn is_expired(&self, now: Instant, idle: Duration) -> bool {
        match self.last_seen() {
            Some(seen) => now.duration_since(seen) > self.window.max(idle),
            None => true,
        }
    }

    fn time_until_slot(&self, now: Instant) -> Duration {
        match self.admissions.front() {
            Some(oldest) => (*oldest + self.window).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }
}

/// Thread-safe rate limiter.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-key admission windows
    windows: Arc<RwLock<HashMap<String, Window>>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Admit or reject one request for `key`.
    pub async fn admit(&self, key: &str, limit: u32, window: Duration) -> bool {
        self.check(key, limit, window).await.is_allowed()
    }

    /// Check the configured redirect limit for `key`.
    pub async fn check_redirect(&self, key: &str) -> RateLimitResult {
        self.check(key, self.config.redirects_per_min, self.config.window_duration())
            .await
    }

    /// Check and, when admitted, record one request for `key`.
    pub async fn check(&self, key: &str, limit: u32, window: Duration) -> RateLimitResult {
        let now = Instant::now();
        let mut windows = self.windows.write().await;

        if !windows.contains_key(key) && windows.len() >= self.config.max_tracked_keys {
            if let Err(retry_after) = Self::make_room(&mut windows, now) {
                warn!(
                    key,
                    tracked = windows.len(),
                    ?retry_after,
                    "Rate limiter key table full, rejecting new key"
                );
                return RateLimitResult::Limited { retry_after };
            }
        }

        let entry = windows.entry(key.to_string()).or_default();
        entry.window = window;
        entry.trim(now);

        let count = entry.admissions.len() as u32;
        if count < limit {
            entry.admissions.push_back(now);
            RateLimitResult::Allowed {
                remaining: limit - count - 1,
                reset_in: entry.time_until_slot(now),
            }
        } else {
            let retry_after = entry.time_until_slot(now);
            debug!(key, limit, ?retry_after, "Rate limit exceeded");
            RateLimitResult::Limited { retry_after }
        }
    }

    /// Drop keys whose admissions have all left their window. Live keys are
    /// never evicted; when none has expired, returns how long until the
    /// first one does.
    fn make_room(
        windows: &mut HashMap<String, Window>,
        now: Instant,
    ) -> Result<(), Duration> {
        let before = windows.len();
        windows.retain(|_, w| !w.is_expired(now, Duration::ZERO));
        if windows.len() < before {
            debug!(evicted = before - windows.len(), "Evicted expired rate limiter keys");
            return Ok(());
        }

        let soonest = windows
            .values()
            .filter_map(Window::expires_at)
            .min()
            .map(|at| at.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO);
        Err(soonest)
    }

    /// Clean up expired entries (should be called periodically).
    pub async fn cleanup(&self) {
        let now = Instant::now();
        let stale_after = self.config.stale_after();

        let mut windows = self.windows.write().await;
        let before = windows.len();
        windows.retain(|_, w| !w.is_expired(now, stale_after));
        debug!(evicted = before - windows.len(), remaining = windows.len(), "Rate limiter cleanup");
    }

    /// Number of keys currently tracked.
    pub async fn tracked_keys(&self) -> usize {
        self.windows.read().await.len()
    }
}
