// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Error types for the engagement ledger service.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Redirect target not allowed: {host}")]
    DomainNotAllowed { host: String },

    #[error("Only the owner may modify post {0}")]
    NotOwner(String),

    #[error("Cannot {action} your own post")]
    SelfAction { action: &'static str },

    #[error("Invalid URL for {param}: {url}")]
    InvalidUrl { param: &'static str, url: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing caller identity")]
    MissingCaller,

    #[error("Rate limit exceeded")]
    RateLimited { retry_after: Duration },

    #[error("Storage did not respond within {0:?}")]
    StorageTimeout(Duration),
}

impl AppError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::PostNotFound(_) | Self::UserNotFound(_) => StatusCode::NOT_FOUND,
            Self::DomainNotAllowed { .. } | Self::NotOwner(_) => StatusCode::FORBIDDEN,
            Self::SelfAction { .. } | Self::InvalidUrl { .. } | Self::InvalidInput(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::MissingCaller => StatusCode::UNAUTHORIZED,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::StorageTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::PostNotFound(_) => "POST_NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::DomainNotAllowed { .. } => "DOMAIN_NOT_ALLOWED",
            Self::NotOwner(_) => "NOT_OWNER",
            Self::SelfAction { .. } => "SELF_ACTION",
            Self::InvalidUrl { .. } => "INVALID_URL",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::MissingCaller => "MISSING_CALLER",
            Self::RateLimited { .. } => "RATE_LIMITED",
            Self::StorageTimeout(_) => "STORAGE_TIMEOUT",
        }
    }

    /// Whether the caller may retry the same request later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::StorageTimeout(_))
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_secs: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after_secs = self.is_retryable().then(|| match &self {
            Self::RateLimited { retry_after } => whole_secs_up(*retry_after),
            _ => 1,
        });
        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: self.code(),
            retry_after_secs,
        });

        match retry_after_secs {
            Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
            None => (status, body).into_response(),
        }
    }
}

/// Seconds to advertise for a wait of `wait`: rounded up, never zero.
pub fn whole_secs_up(wait: Duration) -> u64 {
    (wait.as_secs() + u64::from(wait.subsec_nanos() > 0)).max(1)
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
