// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Engagement ledger: the only place points are awarded.
//!
//! An engage is checked in a fixed order:
//! 1. Owner guard. Owners never score on their own posts and never reach
//!    the dedup state.
//! 2. Per-post window (same user, same post).
//! 3. Canonical window (same user, same content via any post).
//!
//! Steps 2 and 3 plus the insert and the points credit are a single
//! atomic storage call, so concurrent requests cannot both win.

use crate::config::LedgerConfig;
use crate::error::{AppError, Result};
use crate::models::{Clip, EngagementEvent, EngagementType, Post};
use crate::store::{with_timeout, DedupOutcome, DedupWindows, Store};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

/// Points for one qualifying click-through.
pub const ENGAGE_POINTS: u32 = 1;

/// Points for each clip made from someone else's post.
pub const CLIP_POINTS: u32 = 2;

/// What happened to an engage attempt. Only `Awarded` changed any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngageOutcome {
    Awarded,
    SelfEngagement,
    DuplicatePost,
    DuplicateCanonical,
}

impl EngageOutcome {
    pub fn points_awarded(&self) -> u32 {
        match self {
            Self::Awarded => ENGAGE_POINTS,
            _ => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Awarded => "awarded",
            Self::SelfEngagement => "self",
            Self::DuplicatePost => "duplicate_post",
            Self::DuplicateCanonical => "duplicate_canonical",
        }
    }
}

impl From<DedupOutcome> for EngageOutcome {
    fn from(outcome: DedupOutcome) -> Self {
        match outcome {
            DedupOutcome::Inserted => Self::Awarded,
            DedupOutcome::DuplicatePost => Self::DuplicatePost,
            DedupOutcome::DuplicateCanonical => Self::DuplicateCanonical,
        }
    }
}

pub struct EngagementLedger {
    store: Arc<dyn Store>,
    windows: DedupWindows,
    storage_timeout: Duration,
}

impl EngagementLedger {
    pub fn new(store: Arc<dyn Store>, config: &LedgerConfig) -> Self {
        Self {
            store,
            windows: DedupWindows {
                post: config.post_dedup_window(),
                canonical: config.canonical_dedup_window(),
            },
            storage_timeout: config.storage_timeout(),
        }
    }

    /// Award an engage point to `actor_user_id` unless it is the owner or a
    /// recent engage already covers this post or its content.
    pub async fn record_engage_or_skip(
        &self,
        actor_user_id: &str,
        post: &Post,
        now: DateTime<Utc>,
    ) -> Result<EngageOutcome> {
        if actor_user_id == post.owner_user_id {
            debug!(user_id = %actor_user_id, post_id = %post.id, "Owner view, not scored");
            return Ok(EngageOutcome::SelfEngagement);
        }

        let event = EngagementEvent::new(
            actor_user_id,
            post,
            EngagementType::Engage,
            ENGAGE_POINTS,
            now,
        );
        let outcome: EngageOutcome = with_timeout(
            self.storage_timeout,
            self.store.insert_engagement_if_absent(event, self.windows),
        )
        .await?
        .into();

        match outcome {
            EngageOutcome::Awarded => info!(
                user_id = %actor_user_id,
                post_id = %post.id,
                canonical_url = %post.canonical_url,
                points = ENGAGE_POINTS,
                "Engagement awarded"
            ),
            skipped => debug!(
                user_id = %actor_user_id,
                post_id = %post.id,
                outcome = skipped.as_str(),
                "Engagement deduplicated"
            ),
        }
        Ok(outcome)
    }

    /// Store a clip of `post` by `clipper_user_id` and award clip points.
    /// Every clip scores; there is no dedup window.
    pub async fn record_clip(
        &self,
        clipper_user_id: &str,
        post: &Post,
        clip_url: &str,
        now: DateTime<Utc>,
    ) -> Result<Clip> {
        if clipper_user_id == post.owner_user_id {
            return Err(AppError::SelfAction { action: "clip" });
        }

        let clip = Clip {
            id: Uuid::new_v4().to_string(),
            post_id: post.id.clone(),
            clip_url: clip_url.to_string(),
            creator_user_id: clipper_user_id.to_string(),
            created_at: now,
        };
        let event = EngagementEvent::new(clipper_user_id, post, EngagementType::Clip, CLIP_POINTS, now);

        let clip = with_timeout(self.storage_timeout, self.store.insert_clip(clip, event)).await?;
        info!(
            user_id = %clipper_user_id,
            post_id = %post.id,
            clip_id = %clip.id,
            points = CLIP_POINTS,
            "Clip recorded"
        );
        Ok(clip)
    }
}
