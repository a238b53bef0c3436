// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics.

use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    /// Redirects issued, by ledger outcome
    pub redirects: IntCounterVec,
    /// Redirect requests refused before the redirect, by reason
    pub rejections: IntCounterVec,
    /// Points credited, by engagement type
    pub points: IntCounterVec,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new_custom(Some("streamhouse".to_string()), None)?;

        let redirects = IntCounterVec::new(
            Opts::new("redirects_total", "Redirects issued by ledger outcome"),
            &["outcome"],
        )?;
        let rejections = IntCounterVec::new(
            Opts::new("redirect_rejections_total", "Redirect requests refused"),
            &["reason"],
        )?;
        let points = IntCounterVec::new(
            Opts::new("points_awarded_total", "Points credited by engagement type"),
            &["type"],
        )?;

        registry.register(Box::new(redirects.clone()))?;
        registry.register(Box::new(rejections.clone()))?;
        registry.register(Box::new(points.clone()))?;

        Ok(Self {
            registry,
            redirects,
            rejections,
            points,
        })
    }

    /// Text exposition format.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_includes_counters() {
        let metrics = Metrics::new().unwrap();
        metrics.redirects.with_label_values(&["awarded"]).inc();
        metrics.points.with_label_values(&["engage"]).inc_by(1);

        let text = metrics.render().unwrap();
        assert!(text.contains("streamhouse_redirects_total{outcome=\"awarded\"} 1"));
        assert!(text.contains("streamhouse_points_awarded_total{type=\"engage\"} 1"));
    }
}
