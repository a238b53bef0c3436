// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the engagement ledger service.
//!
//! The redirect endpoint is the hot path: rate limit, post lookup,
//! allowlist check on the canonical URL, ledger, then a 302. Once the
//! first three gates pass the redirect is issued whatever the ledger
//! decided, so the response never reveals whether points were awarded.

use crate::config::Config;
use crate::error::{whole_secs_up, AppError, Result};
use crate::ledger::{EngageOutcome, EngagementLedger, CLIP_POINTS};
use crate::limiter::{RateLimitResult, RateLimiter};
use crate::metrics::Metrics;
use crate::models::{Clip, NewPost, Post, User};
use crate::points::{PointsAggregator, PointsBreakdown, PointsSummary};
use crate::store::{with_timeout, Store};
use crate::validator::{RedirectValidator, ValidationError, ValidationResult};
use crate::visibility::VisibilityPolicy;
use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Shared application state.
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub limiter: RateLimiter,
    pub validator: RedirectValidator,
    pub ledger: EngagementLedger,
    pub points: PointsAggregator,
    pub visibility: VisibilityPolicy,
    pub metrics: Metrics,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn Store>) -> prometheus::Result<Self> {
        Ok(Self {
            limiter: RateLimiter::new(config.rate_limit.clone()),
            validator: RedirectValidator::new(config.validation.clone()),
            ledger: EngagementLedger::new(store.clone(), &config.ledger),
            points: PointsAggregator::new(store.clone(), config.ledger.storage_timeout()),
            visibility: VisibilityPolicy::new(&config.visibility),
            metrics: Metrics::new()?,
            store,
            config,
        })
    }

    fn storage_timeout(&self) -> Duration {
        self.config.ledger.storage_timeout()
    }

    /// Look up a live post; deleted posts are reported as missing.
    async fn live_post(&self, post_id: &str) -> Result<Post> {
        with_timeout(self.storage_timeout(), self.store.get_post(post_id))
            .await?
            .filter(|p| !p.deleted)
            .ok_or_else(|| AppError::PostNotFound(post_id.to_string()))
    }
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/r/:post_id", get(redirect))
        .route("/clips", post(create_clip))
        .route("/posts", post(create_post))
        .route("/posts/:post_id", delete(delete_post))
        .route("/houses/:house_id/feed", get(house_feed))
        .route("/users", post(create_user))
        .route("/users/:user_id/profile", get(profile))
        .route("/users/:user_id/points", get(points_summary));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(scrape_metrics));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Caller identity taken from the `X-User-Id` header.
pub struct CallerId(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| CallerId(v.to_string()))
            .ok_or(AppError::MissingCaller)
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "streamhouse-ledger",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Admissions left for the caller's `ip:user` key after this redirect.
pub const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
/// Seconds until the oldest admission for the key leaves the window.
pub const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// Viewer user id; absent for anonymous clicks
    #[serde(default)]
    pub u: Option<String>,
}

/// `GET /r/{postId}?u={userId}`: score the click if eligible, then redirect.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(post_id): Path<String>,
    Query(query): Query<RedirectQuery>,
) -> Result<Response> {
    let viewer = query.u.as_deref().map(str::trim).filter(|u| !u.is_empty());
    let key = format!("{}:{}", addr.ip(), viewer.unwrap_or("anonymous"));

    let (remaining, reset_in) = match state.limiter.check_redirect(&key).await {
        RateLimitResult::Allowed { remaining, reset_in } => (remaining, reset_in),
        RateLimitResult::Limited { retry_after } => {
            info!(
                ip = %addr.ip(),
                viewer = ?viewer,
                retry_after_secs = retry_after.as_secs(),
                "Redirect rate limited"
            );
            state.metrics.rejections.with_label_values(&["rate_limited"]).inc();
            return Err(AppError::RateLimited { retry_after });
        }
    };

    let post = match state.live_post(&post_id).await {
        Ok(post) => post,
        Err(err) => {
            state.metrics.rejections.with_label_values(&["not_found"]).inc();
            return Err(err);
        }
    };

    // Re-validate the exact URL that goes into Location
    if let ValidationResult::Invalid(err) = state.validator.validate_redirect(&post.canonical_url) {
        warn!(post_id = %post.id, url = %post.canonical_url, error = %err, "Redirect blocked");
        state.metrics.rejections.with_label_values(&["forbidden"]).inc();
        let host = match err {
            ValidationError::HostNotAllowed { host } => host,
            ValidationError::InvalidUrl { url, .. } => url,
        };
        return Err(AppError::DomainNotAllowed { host });
    }

    let outcome = match viewer {
        Some(user_id) => {
            let outcome = state
                .ledger
                .record_engage_or_skip(user_id, &post, Utc::now())
                .await?;
            if outcome == EngageOutcome::Awarded {
                state
                    .metrics
                    .points
                    .with_label_values(&["engage"])
                    .inc_by(u64::from(outcome.points_awarded()));
            }
            outcome.as_str()
        }
        None => "anonymous",
    };
    state.metrics.redirects.with_label_values(&[outcome]).inc();
    debug!(post_id = %post.id, outcome, "Redirecting");

    Ok((
        StatusCode::FOUND,
        [
            (header::LOCATION, post.canonical_url),
            (header::CACHE_CONTROL, "no-store".to_string()),
            (RATE_LIMIT_REMAINING, remaining.to_string()),
            (RATE_LIMIT_RESET, whole_secs_up(reset_in).to_string()),
        ],
    )
        .into_response())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateClipRequest {
    pub post_id: String,
    pub clip_url: String,
}

/// `POST /clips`: record a clip of someone else's post.
pub async fn create_clip(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
    Json(req): Json<CreateClipRequest>,
) -> Result<(StatusCode, Json<Clip>)> {
    if let ValidationResult::Invalid(ValidationError::InvalidUrl { param, url }) =
        state.validator.validate_url("clipUrl", &req.clip_url)
    {
        return Err(AppError::InvalidUrl { param, url });
    }

    let post = state.live_post(&req.post_id).await?;
    let clip = state
        .ledger
        .record_clip(&caller, &post, req.clip_url.trim(), Utc::now())
        .await?;
    state
        .metrics
        .points
        .with_label_values(&["clip"])
        .inc_by(u64::from(CLIP_POINTS));

    Ok((StatusCode::CREATED, Json(clip)))
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
}

/// `POST /users`
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>)> {
    let username = req.username.trim();
    if username.is_empty() {
        return Err(AppError::InvalidInput("username is required".to_string()));
    }

    let user = with_timeout(
        state.storage_timeout(),
        state.store.create_user(User::new(username)),
    )
    .await?;
    info!(user_id = %user.id, username = %user.username, "User created");
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /posts`: share a link into a house.
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
    Json(req): Json<NewPost>,
) -> Result<(StatusCode, Json<Post>)> {
    if req.house_id.trim().is_empty() {
        return Err(AppError::InvalidInput("houseId is required".to_string()));
    }
    if let ValidationResult::Invalid(ValidationError::InvalidUrl { param, url }) =
        state.validator.validate_url("url", &req.url)
    {
        return Err(AppError::InvalidUrl { param, url });
    }

    let post = Post::from_submission(caller, req, Utc::now());
    let post = with_timeout(state.storage_timeout(), state.store.create_post(post)).await?;
    info!(
        post_id = %post.id,
        house_id = %post.house_id,
        provider = %post.provider,
        canonical_url = %post.canonical_url,
        "Post created"
    );
    Ok((StatusCode::CREATED, Json(post)))
}

/// `DELETE /posts/{postId}`: soft-delete, owner only.
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    CallerId(caller): CallerId,
    Path(post_id): Path<String>,
) -> Result<StatusCode> {
    with_timeout(
        state.storage_timeout(),
        state.store.soft_delete_post(&post_id, &caller),
    )
    .await?;
    info!(post_id = %post_id, "Post soft-deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Post as listed in feeds and profiles.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    #[serde(flatten)]
    pub post: Post,
    pub clip_count: usize,
}

async fn with_clip_counts(state: &AppState, posts: Vec<Post>) -> Result<Vec<PostView>> {
    let mut views = Vec::with_capacity(posts.len());
    for post in posts {
        let clip_count =
            with_timeout(state.storage_timeout(), state.store.count_clips_by_post(&post.id))
                .await?;
        views.push(PostView { post, clip_count });
    }
    Ok(views)
}

/// `GET /houses/{houseId}/feed`: posts inside the feed TTL, newest first.
pub async fn house_feed(
    State(state): State<Arc<AppState>>,
    Path(house_id): Path<String>,
) -> Result<Json<Vec<PostView>>> {
    let now = Utc::now();
    let posts: Vec<Post> =
        with_timeout(state.storage_timeout(), state.store.list_posts_by_house(&house_id))
            .await?
            .into_iter()
            .filter(|p| state.visibility.visible_in_feed(p, now))
            .collect();

    Ok(Json(with_clip_counts(&state, posts).await?))
}

#[derive(Debug, Serialize)]
pub struct ClipsMade {
    pub items: Vec<Clip>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: User,
    pub posts: Vec<PostView>,
    pub clips_made: ClipsMade,
    pub points_breakdown: PointsBreakdown,
}

/// `GET /users/{userId}/profile`: posts inside the profile TTL, clips and points.
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<ProfileResponse>> {
    let user = with_timeout(state.storage_timeout(), state.store.get_user(&user_id))
        .await?
        .ok_or_else(|| AppError::UserNotFound(user_id.clone()))?;

    let now = Utc::now();
    let posts: Vec<Post> =
        with_timeout(state.storage_timeout(), state.store.list_posts_by_owner(&user.id))
            .await?
            .into_iter()
            .filter(|p| state.visibility.visible_on_profile(p, now))
            .collect();
    let posts = with_clip_counts(&state, posts).await?;

    let clips =
        with_timeout(state.storage_timeout(), state.store.list_clips_by_creator(&user.id)).await?;
    let points_breakdown = state.points.breakdown(&user.id).await?;

    Ok(Json(ProfileResponse {
        user,
        posts,
        clips_made: ClipsMade {
            total: clips.len(),
            items: clips,
        },
        points_breakdown,
    }))
}

/// `GET /users/{userId}/points`
pub async fn points_summary(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Result<Json<PointsSummary>> {
    Ok(Json(state.points.summary(&user_id).await?))
}

/// Prometheus scrape endpoint.
pub async fn scrape_metrics(State(state): State<Arc<AppState>>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(err) => {
            warn!(error = %err, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
