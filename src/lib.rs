// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Streamhouse Engagement Ledger
//!
//! Scores click-throughs on shared links and keeps per-user points:
//!
//! - Per-(IP, user) redirect rate limiting (20 rpm default)
//! - URL canonicalization per content platform
//! - Redirect host allowlist with subdomain matching
//! - Engage dedup: 24h per post, 7d per canonical URL
//! - Owner exclusion for engages and clips
//! - Feed (24h) and profile (7d) visibility windows

pub mod canonical;
pub mod config;
pub mod error;
pub mod handlers;
pub mod ledger;
pub mod limiter;
pub mod metrics;
pub mod models;
pub mod points;
pub mod store;
pub mod validator;
pub mod visibility;

pub use config::Config;
pub use error::AppError;
pub use ledger::{EngageOutcome, EngagementLedger};
pub use limiter::{RateLimitResult, RateLimiter};
pub use store::{MemoryStore, Store};
pub use validator::{RedirectValidator, ValidationResult};
