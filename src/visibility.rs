// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Read-time visibility windows for posts.
//!
//! Nothing expires in storage. The feed and the profile each filter on
//! their own TTL every time they are read.

use crate::config::VisibilityConfig;
use crate::models::Post;
use chrono::{DateTime, Duration, Utc};

/// `(now - created_at) <= ttl`, with `now` taken at call time.
pub fn is_within_ttl(created_at: DateTime<Utc>, ttl: Duration) -> bool {
    is_within_ttl_at(created_at, ttl, Utc::now())
}

/// Same as [`is_within_ttl`] against an explicit clock reading.
pub fn is_within_ttl_at(created_at: DateTime<Utc>, ttl: Duration, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(created_at) <= ttl
}

/// Feed and profile TTLs applied to the same posts.
#[derive(Debug, Clone, Copy)]
pub struct VisibilityPolicy {
    pub feed_ttl: Duration,
    pub profile_ttl: Duration,
}

impl VisibilityPolicy {
    pub fn new(config: &VisibilityConfig) -> Self {
        Self {
            feed_ttl: config.feed_ttl(),
            profile_ttl: config.profile_ttl(),
        }
    }

    pub fn visible_in_feed(&self, post: &Post, now: DateTime<Utc>) -> bool {
        !post.deleted && is_within_ttl_at(post.created_at, self.feed_ttl, now)
    }

    pub fn visible_on_profile(&self, post: &Post, now: DateTime<Utc>) -> bool {
        !post.deleted && is_within_ttl_at(post.created_at, self.profile_ttl, now)
    }
}

impl Default for VisibilityPolicy {
    fn default() -> Self {
        Self::new(&VisibilityConfig::default())
    }
}
