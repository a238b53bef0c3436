// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Streamhouse Engagement Ledger Service
//!
//! Redirect-based engagement tracking and points for shared posts.
//!
//! ## Configuration
//!
//! Configuration is loaded from environment variables:
//!
//! - `BIND_ADDR`: Server bind address (default: 0.0.0.0:8080)
//! - `ENGAGE_DEDUP_HOURS`: Per-post engage window (default: 24)
//! - `CANONICAL_DEDUP_DAYS`: Per-canonical-URL engage window (default: 7)
//! - `RATE_LIMIT_R_PER_MIN`: Redirects per minute per IP and user (default: 20)
//! - `REDIRECT_ALLOWLIST`: Comma-separated redirect hosts
//! - `FEED_TTL_HOURS`: House feed visibility (default: 24)
//! - `PROFILE_TTL_DAYS`: Profile visibility (default: 7)
//! - `STORAGE_TIMEOUT_MS`: Storage call timeout (default: 2000)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use streamhouse_ledger::{
    config::Config,
    handlers::{router, AppState},
    store::MemoryStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::from_env();
    info!(
        bind_addr = %config.bind_addr,
        redirects_per_min = config.rate_limit.redirects_per_min,
        engage_dedup_hours = config.ledger.engage_dedup_hours,
        canonical_dedup_days = config.ledger.canonical_dedup_days,
        feed_ttl_hours = config.visibility.feed_ttl_hours,
        profile_ttl_days = config.visibility.profile_ttl_days,
        allowlist = ?config.validation.redirect_allowlist,
        "Starting engagement ledger"
    );

    let store = Arc::new(MemoryStore::new());
    let state = Arc::new(AppState::new(config.clone(), store)?);

    // Spawn cleanup task
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60));
        loop {
            interval.tick().await;
            cleanup_state.limiter.cleanup().await;
        }
    });

    let app = router(state);

    // Start server
    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
