// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-user points breakdown derived from the engagement events.
//!
//! Always a live scan, so the breakdown can never drift from the events.

use crate::error::{AppError, Result};
use crate::models::{EngagementEvent, EngagementType};
use crate::store::{with_timeout, Store};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TypeTotals {
    pub count: u64,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PointsBreakdown {
    pub engage: TypeTotals,
    pub clip: TypeTotals,
    pub collab: TypeTotals,
}

impl PointsBreakdown {
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a EngagementEvent>) -> Self {
        let mut breakdown = Self::default();
        for event in events {
            let bucket = breakdown.bucket_mut(event.engagement_type);
            bucket.count += 1;
            bucket.total += u64::from(event.points);
        }
        breakdown
    }

    pub fn get(&self, engagement_type: EngagementType) -> TypeTotals {
        match engagement_type {
            EngagementType::Engage => self.engage,
            EngagementType::Clip => self.clip,
            EngagementType::Collab => self.collab,
        }
    }

    fn bucket_mut(&mut self, engagement_type: EngagementType) -> &mut TypeTotals {
        match engagement_type {
            EngagementType::Engage => &mut self.engage,
            EngagementType::Clip => &mut self.clip,
            EngagementType::Collab => &mut self.collab,
        }
    }

    /// Sum of all per-type totals.
    pub fn total(&self) -> u64 {
        EngagementType::ALL.iter().map(|t| self.get(*t).total).sum()
    }
}

/// Breakdown together with the user's running counter.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsSummary {
    pub user_id: String,
    pub total_points: u64,
    pub breakdown: PointsBreakdown,
    /// `breakdown.total() == total_points`
    pub consistent: bool,
}

pub struct PointsAggregator {
    store: Arc<dyn Store>,
    storage_timeout: Duration,
}

impl PointsAggregator {
    pub fn new(store: Arc<dyn Store>, storage_timeout: Duration) -> Self {
        Self {
            store,
            storage_timeout,
        }
    }

    pub async fn breakdown(&self, user_id: &str) -> Result<PointsBreakdown> {
        let events = with_timeout(
            self.storage_timeout,
            self.store.list_engagements_by_user(user_id),
        )
        .await?;
        Ok(PointsBreakdown::from_events(&events))
    }

    pub async fn summary(&self, user_id: &str) -> Result<PointsSummary> {
        let user = with_timeout(self.storage_timeout, self.store.get_user(user_id))
            .await?
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        let breakdown = self.breakdown(user_id).await?;

        let consistent = breakdown.total() == user.total_points;
        if !consistent {
            warn!(
                user_id,
                total_points = user.total_points,
                breakdown_total = breakdown.total(),
                "Points counter disagrees with engagement events"
            );
        }

        Ok(PointsSummary {
            user_id: user.id,
            total_points: user.total_points,
            breakdown,
            consistent,
        })
    }
}
