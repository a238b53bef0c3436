// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Redirect target validation.
//!
//! - Host allowlist with subdomain matching
//! - URL format validation (http/https with a host)

use crate::config::ValidationConfig;
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid URL format for {param}: {url}")]
    InvalidUrl { param: &'static str, url: String },

    #[error("Host not in redirect allowlist: {host}")]
    HostNotAllowed { host: String },
}

/// Result of validation.
#[derive(Debug, Clone)]
pub enum ValidationResult {
    /// Request is valid
    Valid,
    /// Request is invalid
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn error(&self) -> Option<&ValidationError> {
        match self {
            ValidationResult::Valid => None,
            ValidationResult::Invalid(e) => Some(e),
        }
    }
}

/// True iff `host` equals `domain` or is a subdomain of it.
///
/// Both arguments are expected lower-case.
pub fn host_matches(host: &str, domain: &str) -> bool {
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// Check `url`'s host against `allowlist`. Malformed URLs are never allowed.
pub fn is_allowed(url: &str, allowlist: &HashSet<String>) -> bool {
    let host = match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => host.to_ascii_lowercase(),
            None => return false,
        },
        Err(_) => return false,
    };

    allowlist.iter().any(|entry| host_matches(&host, entry))
}

/// Lower-case and trim an allowlist entry; drops a leading dot.
fn normalize_entry(entry: &str) -> Option<String> {
    let entry = entry.trim().trim_start_matches('.').to_ascii_lowercase();
    (!entry.is_empty()).then_some(entry)
}

/// Guard run on every redirect target.
pub struct RedirectValidator {
    allowlist: HashSet<String>,
}

impl RedirectValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        let allowlist = config
            .redirect_allowlist
            .iter()
            .filter_map(|entry| normalize_entry(entry))
            .collect();
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &HashSet<String> {
        &self.allowlist
    }

    /// Validate that `url` is an http(s) URL with a host.
    pub fn validate_url(&self, param: &'static str, url: &str) -> ValidationResult {
        let parsed = match Url::parse(url.trim()) {
            Ok(u) => u,
            Err(_) => {
                debug!(param, url = %url, "Invalid URL format");
                return ValidationResult::Invalid(ValidationError::InvalidUrl {
                    param,
                    url: url.to_string(),
                });
            }
        };

        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            debug!(param, url = %url, "Invalid URL (bad scheme or no host)");
            return ValidationResult::Invalid(ValidationError::InvalidUrl {
                param,
                url: url.to_string(),
            });
        }

        ValidationResult::Valid
    }

    /// Validate a redirect target: well-formed and allowlisted.
    ///
    /// Must be called with the URL actually placed in `Location`.
    pub fn validate_redirect(&self, url: &str) -> ValidationResult {
        let format = self.validate_url("redirect", url);
        if !format.is_valid() {
            return format;
        }

        if is_allowed(url, &self.allowlist) {
            debug!(url = %url, "Redirect target allowed");
            ValidationResult::Valid
        } else {
            let host = Url::parse(url)
                .ok()
                .and_then(|u| u.host_str().map(str::to_ascii_lowercase))
                .unwrap_or_default();
            debug!(url = %url, host = %host, "Redirect target not in allowlist");
            ValidationResult::Invalid(ValidationError::HostNotAllowed { host })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowlist(entries: &[&str]) -> HashSet<String> {
        entries.iter().map(|s| s.to_string()).collect()
    }

    fn validator(entries: &[&str]) -> RedirectValidator {
        RedirectValidator::new(ValidationConfig {
            redirect_allowlist: entries.iter().map(|s| s.to_string()).collect(),
        })
    }

    #[test]
    fn test_subdomain_matching() {
        let list = allowlist(&["tiktok.com"]);
        assert!(is_allowed("https://vm.tiktok.com/x", &list));
        assert!(is_allowed("https://tiktok.com/x", &list));
        assert!(is_allowed("https://WWW.TikTok.com/@a", &list));
        assert!(!is_allowed("https://nottiktok.com/x", &list));
        assert!(!is_allowed("https://tiktok.com.evil.example/x", &list));
    }

    #[test]
    fn test_malformed_urls_rejected() {
        let list = allowlist(&["example.com"]);
        assert!(!is_allowed("not a url", &list));
        assert!(!is_allowed("", &list));
        assert!(!is_allowed("mailto:a@example.com", &list));
    }

    #[test]
    fn test_host_matches() {
        assert!(host_matches("a.b.example.com", "example.com"));
        assert!(!host_matches("example.com", "a.example.com"));
        assert!(!host_matches("badexample.com", "example.com"));
    }

    #[test]
    fn test_entries_normalized() {
        let v = validator(&[" .YouTube.com ", "", "x.com"]);
        assert_eq!(v.allowlist().len(), 2);
        assert!(v.validate_redirect("https://www.youtube.com/watch?v=a").is_valid());
    }

    #[test]
    fn test_redirect_rejects_non_http_schemes() {
        let v = validator(&["example.com"]);

        let result = v.validate_redirect("javascript:alert(1)");
        assert!(matches!(result.error(), Some(ValidationError::InvalidUrl { .. })));

        let result = v.validate_redirect("ftp://example.com/file");
        assert!(!result.is_valid(), "FTP URL should be rejected");
    }

    #[test]
    fn test_redirect_reports_host() {
        let v = validator(&["youtube.com"]);
        let result = v.validate_redirect("https://Evil.Example/watch");
        assert_eq!(
            result.error(),
            Some(&ValidationError::HostNotAllowed {
                host: "evil.example".into()
            })
        );
    }

    #[test]
    fn test_validate_url() {
        let v = validator(&[]);
        assert!(v.validate_url("clipUrl", "https://www.tiktok.com/@me/video/1").is_valid());
        assert!(!v.validate_url("clipUrl", "https://").is_valid());
        assert!(!v.validate_url("clipUrl", "file:///etc/passwd").is_valid());
    }
}
