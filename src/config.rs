// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the engagement ledger service.
//!
//! Every field has a serde default; `Config::from_env` overlays the
//! environment on top of those defaults.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// Configuration for the engagement ledger service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Redirect validation configuration
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Engagement scoring configuration
    #[serde(default)]
    pub ledger: LedgerConfig,

    /// Feed/profile visibility configuration
    #[serde(default)]
    pub visibility: VisibilityConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Rate limiting configuration for the redirect endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Redirects per window per (client IP, user) (default: 20)
    #[serde(default = "default_redirects_per_min")]
    pub redirects_per_min: u32,

    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Upper bound on tracked keys (default: 100000)
    #[serde(default = "default_max_tracked_keys")]
    pub max_tracked_keys: usize,

    /// Keys idle for this long are evicted by cleanup (default: 300)
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

/// Redirect validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Hosts (and their subdomains) a redirect may target
    #[serde(default = "default_redirect_allowlist")]
    pub redirect_allowlist: Vec<String>,
}

/// Engagement scoring configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Per-post dedup window in hours (default: 24)
    #[serde(default = "default_engage_dedup_hours")]
    pub engage_dedup_hours: u64,

    /// Per-canonical-URL dedup window in days (default: 7)
    #[serde(default = "default_canonical_dedup_days")]
    pub canonical_dedup_days: u64,

    /// Storage call timeout in milliseconds (default: 2000)
    #[serde(default = "default_storage_timeout_ms")]
    pub storage_timeout_ms: u64,
}

/// Read-time visibility windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityConfig {
    /// House feed TTL in hours (default: 24)
    #[serde(default = "default_feed_ttl_hours")]
    pub feed_ttl_hours: u64,

    /// Profile TTL in days (default: 7)
    #[serde(default = "default_profile_ttl_days")]
    pub profile_ttl_days: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_redirects_per_min() -> u32 {
    20
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_tracked_keys() -> usize {
    100_000
}

fn default_stale_after_secs() -> u64 {
    300
}

fn default_redirect_allowlist() -> Vec<String> {
    [
        "youtube.com",
        "youtu.be",
        "tiktok.com",
        "instagram.com",
        "twitch.tv",
        "twitter.com",
        "x.com",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_engage_dedup_hours() -> u64 {
    24
}

fn default_canonical_dedup_days() -> u64 {
    7
}

fn default_storage_timeout_ms() -> u64 {
    2000
}

fn default_feed_ttl_hours() -> u64 {
    24
}

fn default_profile_ttl_days() -> u64 {
    7
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            validation: ValidationConfig::default(),
            ledger: LedgerConfig::default(),
            visibility: VisibilityConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            redirects_per_min: default_redirects_per_min(),
            window_secs: default_window_secs(),
            max_tracked_keys: default_max_tracked_keys(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            redirect_allowlist: default_redirect_allowlist(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            engage_dedup_hours: default_engage_dedup_hours(),
            canonical_dedup_days: default_canonical_dedup_days(),
            storage_timeout_ms: default_storage_timeout_ms(),
        }
    }
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            feed_ttl_hours: default_feed_ttl_hours(),
            profile_ttl_days: default_profile_ttl_days(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn stale_after(&self) -> Duration {
        Duration::from_secs(self.stale_after_secs)
    }
}

impl LedgerConfig {
    pub fn post_dedup_window(&self) -> chrono::Duration {
        hours(self.engage_dedup_hours)
    }

    pub fn canonical_dedup_window(&self) -> chrono::Duration {
        hours(self.canonical_dedup_days.saturating_mul(24))
    }

    pub fn storage_timeout(&self) -> Duration {
        Duration::from_millis(self.storage_timeout_ms)
    }
}

impl VisibilityConfig {
    pub fn feed_ttl(&self) -> chrono::Duration {
        hours(self.feed_ttl_hours)
    }

    pub fn profile_ttl(&self) -> chrono::Duration {
        hours(self.profile_ttl_days.saturating_mul(24))
    }
}

/// Hours as a chrono duration, saturating at `TimeDelta::MAX`.
fn hours(value: u64) -> chrono::Duration {
    i64::try_from(value)
        .ok()
        .and_then(chrono::Duration::try_hours)
        .unwrap_or(chrono::TimeDelta::MAX)
}

/// Largest accepted hour-based setting (100 years).
const MAX_HOURS: u64 = 24 * 365 * 100;

/// Largest accepted day-based setting (100 years).
const MAX_DAYS: u64 = 365 * 100;

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let redirect_allowlist = lookup("REDIRECT_ALLOWLIST")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.validation.redirect_allowlist);

        Config {
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                redirects_per_min: parse_in_range(
                    &lookup,
                    "RATE_LIMIT_R_PER_MIN",
                    defaults.rate_limit.redirects_per_min,
                    1..=u32::MAX,
                ),
                max_tracked_keys: parse_in_range(
                    &lookup,
                    "RATE_LIMIT_MAX_KEYS",
                    defaults.rate_limit.max_tracked_keys,
                    1..=usize::MAX,
                ),
                ..defaults.rate_limit
            },
            validation: ValidationConfig { redirect_allowlist },
            ledger: LedgerConfig {
                engage_dedup_hours: parse_in_range(
                    &lookup,
                    "ENGAGE_DEDUP_HOURS",
                    defaults.ledger.engage_dedup_hours,
                    1..=MAX_HOURS,
                ),
                canonical_dedup_days: parse_in_range(
                    &lookup,
                    "CANONICAL_DEDUP_DAYS",
                    defaults.ledger.canonical_dedup_days,
                    1..=MAX_DAYS,
                ),
                storage_timeout_ms: parse_in_range(
                    &lookup,
                    "STORAGE_TIMEOUT_MS",
                    defaults.ledger.storage_timeout_ms,
                    1..=u64::MAX,
                ),
            },
            visibility: VisibilityConfig {
                feed_ttl_hours: parse_in_range(
                    &lookup,
                    "FEED_TTL_HOURS",
                    defaults.visibility.feed_ttl_hours,
                    1..=MAX_HOURS,
                ),
                profile_ttl_days: parse_in_range(
                    &lookup,
                    "PROFILE_TTL_DAYS",
                    defaults.visibility.profile_ttl_days,
                    1..=MAX_DAYS,
                ),
            },
            metrics: MetricsConfig {
                enabled: parse_or(&lookup, "METRICS_ENABLED", defaults.metrics.enabled),
                ..defaults.metrics
            },
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + std::fmt::Debug,
{
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(key, value = %raw, ?default, "Ignoring unparseable config value");
                default
            }
        },
        None => default,
    }
}

fn parse_in_range<F, T>(lookup: &F, key: &str, default: T, range: RangeInclusive<T>) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + PartialOrd + Copy + std::fmt::Debug,
{
    let value = parse_or(lookup, key, default);
    if range.contains(&value) {
        return value;
    }
    warn!(key, value = ?value, ?default, "Config value out of range, using default");
    default
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config.rate_limit.redirects_per_min, 20);
        assert_eq!(config.ledger.engage_dedup_hours, 24);
        assert_eq!(config.ledger.canonical_dedup_days, 7);
        assert_eq!(config.visibility.feed_ttl_hours, 24);
        assert_eq!(config.visibility.profile_ttl(), chrono::Duration::hours(168));
        assert!(config
            .validation
            .redirect_allowlist
            .contains(&"tiktok.com".to_string()));
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("ENGAGE_DEDUP_HOURS", "12"),
            ("CANONICAL_DEDUP_DAYS", "3"),
            ("RATE_LIMIT_R_PER_MIN", "5"),
            ("REDIRECT_ALLOWLIST", "example.com, , vimeo.com"),
            ("FEED_TTL_HOURS", "6"),
            ("METRICS_ENABLED", "false"),
        ]));

        assert_eq!(config.ledger.post_dedup_window(), chrono::Duration::hours(12));
        assert_eq!(config.ledger.canonical_dedup_window(), chrono::Duration::hours(72));
        assert_eq!(config.rate_limit.redirects_per_min, 5);
        assert_eq!(
            config.validation.redirect_allowlist,
            vec!["example.com".to_string(), "vimeo.com".to_string()]
        );
        assert_eq!(config.visibility.feed_ttl(), chrono::Duration::hours(6));
        assert!(!config.metrics.enabled);
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("ENGAGE_DEDUP_HOURS", "a day"),
            ("REDIRECT_ALLOWLIST", " , "),
        ]));
        assert_eq!(config.ledger.engage_dedup_hours, 24);
        assert_eq!(config.validation.redirect_allowlist.len(), 7);
    }

    #[test]
    fn test_out_of_range_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("ENGAGE_DEDUP_HOURS", "18446744073709551615"),
            ("CANONICAL_DEDUP_DAYS", "0"),
            ("PROFILE_TTL_DAYS", "1000000000000"),
            ("FEED_TTL_HOURS", "1000000000000"),
            ("RATE_LIMIT_R_PER_MIN", "0"),
        ]));

        assert_eq!(config.ledger.post_dedup_window(), chrono::Duration::hours(24));
        assert_eq!(config.ledger.canonical_dedup_window(), chrono::Duration::days(7));
        assert_eq!(config.visibility.profile_ttl(), chrono::Duration::days(7));
        assert_eq!(config.visibility.feed_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.rate_limit.redirects_per_min, 20);
    }

    #[test]
    fn test_window_helpers_saturate() {
        let ledger = LedgerConfig {
            engage_dedup_hours: u64::MAX,
            canonical_dedup_days: u64::MAX,
            ..Default::default()
        };
        assert_eq!(ledger.post_dedup_window(), chrono::TimeDelta::MAX);
        assert_eq!(ledger.canonical_dedup_window(), chrono::TimeDelta::MAX);
        assert!(ledger.post_dedup_window() > chrono::Duration::zero());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: Config =
            serde_json::from_str(r#"{"ledger": {"engage_dedup_hours": 1}}"#).unwrap();
        assert_eq!(config.ledger.engage_dedup_hours, 1);
        assert_eq!(config.ledger.canonical_dedup_days, 7);
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }
}
