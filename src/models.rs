// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Data models for users, posts, clips and engagement events.

use crate::canonical::Provider;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of scored interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementType {
    /// Click-through on a post's link
    Engage,
    /// Clip created from another creator's post
    Clip,
    /// Collaboration credit
    Collab,
}

impl EngagementType {
    pub const ALL: [EngagementType; 3] = [Self::Engage, Self::Clip, Self::Collab];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engage => "engage",
            Self::Clip => "clip",
            Self::Collab => "collab",
        }
    }
}

impl std::fmt::Display for EngagementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub username: String,
    /// Running points counter; only the ledger's atomic write mutates it
    pub total_points: u64,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.into(),
            total_points: 0,
            created_at: Utc::now(),
        }
    }
}

/// Shared link posted into a house.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub owner_user_id: String,
    pub house_id: String,
    pub original_url: String,
    /// Dedup key for the cross-post engagement window
    pub canonical_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub thumbnail_url: Option<String>,
    pub provider: Provider,
    pub created_at: DateTime<Utc>,
    pub deleted: bool,
}

/// Fields supplied when creating a post.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPost {
    pub house_id: String,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub provider: Option<String>,
}

impl Post {
    /// Build a post owned by `owner_user_id`, detecting the provider when
    /// the submission does not name one and computing the canonical URL.
    pub fn from_submission(owner_user_id: impl Into<String>, new: NewPost, now: DateTime<Utc>) -> Self {
        let provider = match new.provider.as_deref() {
            Some(name) => Provider::from_name(name),
            None => Provider::detect(&new.url),
        };
        let canonical_url = crate::canonical::canonicalize(&new.url, provider);

        Self {
            id: Uuid::new_v4().to_string(),
            owner_user_id: owner_user_id.into(),
            house_id: new.house_id,
            original_url: new.url,
            canonical_url,
            title: new.title,
            description: new.description,
            thumbnail_url: new.thumbnail_url,
            provider,
            created_at: now,
            deleted: false,
        }
    }
}

/// Clip made by one creator from another creator's post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub post_id: String,
    pub clip_url: String,
    pub creator_user_id: String,
    pub created_at: DateTime<Utc>,
}

/// Append-only record of a scored interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementEvent {
    pub id: String,
    pub user_id: String,
    pub post_id: String,
    /// Copied from the post when the event is recorded
    pub canonical_url: String,
    #[serde(rename = "type")]
    pub engagement_type: EngagementType,
    pub points: u32,
    pub created_at: DateTime<Utc>,
}

impl EngagementEvent {
    pub fn new(
        user_id: impl Into<String>,
        post: &Post,
        engagement_type: EngagementType,
        points: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            post_id: post.id.clone(),
            canonical_url: post.canonical_url.clone(),
            engagement_type,
            points,
            created_at,
        }
    }
}
