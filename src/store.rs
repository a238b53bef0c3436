// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Storage abstraction for users, posts, clips and engagement events.
//!
//! Writes that award points go through a single call that checks the dedup
//! windows, appends the event and bumps the user's total as one unit.
//! Backends must make that unit atomic per user.

use crate::error::{AppError, Result};
use crate::models::{Clip, EngagementEvent, EngagementType, Post, User};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::RwLock;
use tracing::debug;

/// Dedup windows checked before an `engage` event is inserted.
#[derive(Debug, Clone, Copy)]
pub struct DedupWindows {
    /// Same (user, post)
    pub post: Duration,
    /// Same (user, canonical URL), across posts
    pub canonical: Duration,
}

/// Result of an insert-if-absent-in-window call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DedupOutcome {
    /// Event recorded and points credited
    Inserted,
    /// An engage event for this post exists inside the post window
    DuplicatePost,
    /// An engage event for this canonical URL exists inside the canonical window
    DuplicateCanonical,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: User) -> Result<User>;
    async fn get_user(&self, id: &str) -> Result<Option<User>>;

    async fn create_post(&self, post: Post) -> Result<Post>;
    async fn get_post(&self, id: &str) -> Result<Option<Post>>;
    /// Mark a post deleted. Only its owner may do so.
    async fn soft_delete_post(&self, id: &str, owner_user_id: &str) -> Result<Post>;
    async fn list_posts_by_house(&self, house_id: &str) -> Result<Vec<Post>>;
    async fn list_posts_by_owner(&self, owner_user_id: &str) -> Result<Vec<Post>>;

    /// Atomically: skip if an `engage` event by `event.user_id` falls inside
    /// either window (measured back from `event.created_at`), otherwise append
    /// `event` and add its points to the user's total.
    async fn insert_engagement_if_absent(
        &self,
        event: EngagementEvent,
        windows: DedupWindows,
    ) -> Result<DedupOutcome>;

    /// Atomically store a clip, append its event and credit the creator.
    async fn insert_clip(&self, clip: Clip, event: EngagementEvent) -> Result<Clip>;

    async fn list_engagements_by_user(&self, user_id: &str) -> Result<Vec<EngagementEvent>>;
    async fn list_clips_by_creator(&self, creator_user_id: &str) -> Result<Vec<Clip>>;
    async fn count_clips_by_post(&self, post_id: &str) -> Result<usize>;
}

/// Bound a storage call. Elapsed calls surface as a retryable error and
/// never as a skipped write.
pub async fn with_timeout<T, F>(timeout: std::time::Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AppError::StorageTimeout(timeout)),
    }
}

/// Oldest instant inside a window ending at `at`. A window reaching past
/// the representable range covers all history.
fn window_start(at: DateTime<Utc>, window: Duration) -> DateTime<Utc> {
    at.checked_sub_signed(window).unwrap_or(DateTime::<Utc>::MIN_UTC)
}

#[derive(Debug, Default)]
struct Tables {
    users: HashMap<String, User>,
    posts: HashMap<String, Post>,
    clips: HashMap<String, Clip>,
    /// Engagement events per acting user, in insertion order
    events: HashMap<String, Vec<EngagementEvent>>,
}

impl Tables {
    fn credit(&mut self, user_id: &str, points: u32) -> Result<()> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| AppError::UserNotFound(user_id.to_string()))?;
        user.total_points += u64::from(points);
        Ok(())
    }
}

/// In-memory backend. A single lock serializes every write, which is the
/// atomicity the ledger relies on.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> DateTime<Utc>,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: User) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.username == user.username) {
            return Err(AppError::InvalidInput(format!(
                "username {} already taken",
                user.username
            )));
        }
        tables.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, id: &str) -> Result<Option<User>> {
        Ok(self.tables.read().await.users.get(id).cloned())
    }

    async fn create_post(&self, post: Post) -> Result<Post> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&post.owner_user_id) {
            return Err(AppError::UserNotFound(post.owner_user_id.clone()));
        }
        tables.posts.insert(post.id.clone(), post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.tables.read().await.posts.get(id).cloned())
    }

    async fn soft_delete_post(&self, id: &str, owner_user_id: &str) -> Result<Post> {
        let mut tables = self.tables.write().await;
        let post = tables
            .posts
            .get_mut(id)
            .filter(|p| !p.deleted)
            .ok_or_else(|| AppError::PostNotFound(id.to_string()))?;

        if post.owner_user_id != owner_user_id {
            return Err(AppError::NotOwner(id.to_string()));
        }
        post.deleted = true;
        Ok(post.clone())
    }

    async fn list_posts_by_house(&self, house_id: &str) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let posts = tables
            .posts
            .values()
            .filter(|p| p.house_id == house_id)
            .cloned()
            .collect();
        Ok(newest_first(posts, |p| p.created_at))
    }

    async fn list_posts_by_owner(&self, owner_user_id: &str) -> Result<Vec<Post>> {
        let tables = self.tables.read().await;
        let posts = tables
            .posts
            .values()
            .filter(|p| p.owner_user_id == owner_user_id)
            .cloned()
            .collect();
        Ok(newest_first(posts, |p| p.created_at))
    }

    async fn insert_engagement_if_absent(
        &self,
        event: EngagementEvent,
        windows: DedupWindows,
    ) -> Result<DedupOutcome> {
        let mut tables = self.tables.write().await;

        if !tables.users.contains_key(&event.user_id) {
            return Err(AppError::UserNotFound(event.user_id.clone()));
        }

        let post_since = window_start(event.created_at, windows.post);
        let canonical_since = window_start(event.created_at, windows.canonical);
        let prior = tables
            .events
            .get(&event.user_id)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let engages = || {
            prior
                .iter()
                .filter(|e| e.engagement_type == EngagementType::Engage)
        };

        if engages().any(|e| e.post_id == event.post_id && e.created_at >= post_since) {
            debug!(user_id = %event.user_id, post_id = %event.post_id, "Engage inside post window");
            return Ok(DedupOutcome::DuplicatePost);
        }
        if engages()
            .any(|e| e.canonical_url == event.canonical_url && e.created_at >= canonical_since)
        {
            debug!(
                user_id = %event.user_id,
                canonical_url = %event.canonical_url,
                "Engage inside canonical window"
            );
            return Ok(DedupOutcome::DuplicateCanonical);
        }

        tables.credit(&event.user_id, event.points)?;
        tables
            .events
            .entry(event.user_id.clone())
            .or_default()
            .push(event);
        Ok(DedupOutcome::Inserted)
    }

    async fn insert_clip(&self, clip: Clip, event: EngagementEvent) -> Result<Clip> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&clip.post_id) {
            return Err(AppError::PostNotFound(clip.post_id.clone()));
        }

        tables.credit(&event.user_id, event.points)?;
        tables
            .events
            .entry(event.user_id.clone())
            .or_default()
            .push(event);
        tables.clips.insert(clip.id.clone(), clip.clone());
        Ok(clip)
    }

    async fn list_engagements_by_user(&self, user_id: &str) -> Result<Vec<EngagementEvent>> {
        Ok(self
            .tables
            .read()
            .await
            .events
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_clips_by_creator(&self, creator_user_id: &str) -> Result<Vec<Clip>> {
        let tables = self.tables.read().await;
        let clips = tables
            .clips
            .values()
            .filter(|c| c.creator_user_id == creator_user_id)
            .cloned()
            .collect();
        Ok(newest_first(clips, |c| c.created_at))
    }

    async fn count_clips_by_post(&self, post_id: &str) -> Result<usize> {
        Ok(self
            .tables
            .read()
            .await
            .clips
            .values()
            .filter(|c| c.post_id == post_id)
            .count())
    }
}
