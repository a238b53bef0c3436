// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! URL canonicalization for engagement dedup.
//!
//! Two posts whose links canonicalize to the same string are treated as
//! the same content by the cross-post dedup window. Canonicalization is
//! total: anything that fails to parse is returned unchanged. Parsed URLs
//! come back in `Url` serialized form (lower-case host, `/` for an empty
//! path), so a link with and without tracking noise yields one key.

use crate::validator::host_matches;
use serde::{Deserialize, Serialize};
use url::{form_urlencoded, Url};

/// Query parameters removed by the generic rule.
pub const TRACKING_PARAMS: &[&str] = &[
    "utm_source",
    "utm_medium",
    "utm_campaign",
    "utm_content",
    "utm_term",
    "fbclid",
    "gclid",
];

/// Known content platforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    YouTube,
    TikTok,
    Instagram,
    Twitch,
    Twitter,
    /// Generic web page
    Other,
}

impl Provider {
    /// Host suffixes that identify each platform.
    fn domains(&self) -> &'static [&'static str] {
        match self {
            Self::YouTube => &["youtube.com", "youtu.be"],
            Self::TikTok => &["tiktok.com"],
            Self::Instagram => &["instagram.com"],
            Self::Twitch => &["twitch.tv"],
            Self::Twitter => &["twitter.com", "x.com"],
            Self::Other => &[],
        }
    }

    /// Parse a provider name. Unknown names map to [`Provider::Other`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "youtube" => Self::YouTube,
            "tiktok" => Self::TikTok,
            "instagram" => Self::Instagram,
            "twitch" => Self::Twitch,
            "twitter" | "x" => Self::Twitter,
            _ => Self::Other,
        }
    }

    /// Classify a URL by its parsed host.
    pub fn detect(url: &str) -> Self {
        let host = match Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => host.to_ascii_lowercase(),
                None => return Self::Other,
            },
            Err(_) => return Self::Other,
        };

        [
            Self::YouTube,
            Self::TikTok,
            Self::Instagram,
            Self::Twitch,
            Self::Twitter,
        ]
        .into_iter()
        .find(|provider| provider.domains().iter().any(|d| host_matches(&host, d)))
        .unwrap_or(Self::Other)
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::YouTube => "youtube",
            Self::TikTok => "tiktok",
            Self::Instagram => "instagram",
            Self::Twitch => "twitch",
            Self::Twitter => "twitter",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Canonicalize `url` according to the rules for `provider`.
pub fn canonicalize(url: &str, provider: Provider) -> String {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return url.to_string(),
    };

    match provider {
        Provider::YouTube => match youtube_video_id(&parsed) {
            Some(id) => youtube_watch_url(&id).unwrap_or_else(|| url.to_string()),
            None => url.to_string(),
        },
        Provider::TikTok => {
            let mut stripped = parsed;
            stripped.set_query(None);
            stripped.set_fragment(None);
            stripped.to_string()
        }
        _ => strip_tracking_params(parsed),
    }
}

/// Video id from `youtu.be/<id>` or the `v` parameter on youtube.com.
fn youtube_video_id(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();

    let id = if host_matches(&host, "youtu.be") {
        url.path_segments()?.next().map(str::to_string)
    } else if host_matches(&host, "youtube.com") {
        url.query_pairs()
            .find(|(key, _)| key == "v")
            .map(|(_, value)| value.into_owned())
    } else {
        None
    };

    id.filter(|id| !id.is_empty())
}

fn youtube_watch_url(id: &str) -> Option<String> {
    let mut watch = Url::parse("https://www.youtube.com/watch").ok()?;
    watch.query_pairs_mut().append_pair("v", id);
    Some(watch.to_string())
}

/// Remove tracking parameters from the raw query text. Every other pair
/// keeps its original spelling and order. The result always goes through
/// the same `Url` serialization, stripped or not.
fn strip_tracking_params(mut url: Url) -> String {
    let kept: Option<String> = url.query().map(|query| {
        query
            .split('&')
            .filter(|pair| !is_tracking_pair(pair))
            .collect::<Vec<_>>()
            .join("&")
    });

    match kept.as_deref() {
        Some("") | None => url.set_query(None),
        Some(query) => url.set_query(Some(query)),
    }
    url.to_string()
}

fn is_tracking_pair(pair: &str) -> bool {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(key, _)| TRACKING_PARAMS.contains(&&*key))
        .unwrap_or(false)
}
