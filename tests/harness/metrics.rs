// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for farming simulation results.

use std::collections::HashMap;

/// Collects outcomes during a farming simulation.
#[derive(Debug, Default)]
pub struct FarmingMetrics {
    /// Count of clicks by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of clicks by rate limit key
    clicks_per_key: HashMap<String, usize>,
    /// Engage points credited during the run
    points: u64,
}

/// What happened to a single click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Awarded,
    RateLimited,
    SelfEngagement,
    DuplicatePost,
    DuplicateCanonical,
}

impl FarmingMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a click outcome and the points it earned.
    pub fn record(&mut self, outcome: Outcome, key: &str, points: u32) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.clicks_per_key.entry(key.to_string()).or_insert(0) += 1;
        self.points += u64::from(points);
    }

    pub fn total_clicks(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Ratio of clicks that earned nothing.
    pub fn denial_rate(&self) -> f64 {
        let total = self.total_clicks();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Awarded)) as f64 / total as f64
    }

    pub fn report(&self) -> FarmingReport {
        FarmingReport {
            total_clicks: self.total_clicks(),
            awarded: self.count(Outcome::Awarded),
            rate_limited: self.count(Outcome::RateLimited),
            self_engagement: self.count(Outcome::SelfEngagement),
            duplicate_post: self.count(Outcome::DuplicatePost),
            duplicate_canonical: self.count(Outcome::DuplicateCanonical),
            points: self.points,
            denial_rate: self.denial_rate(),
            unique_keys: self.clicks_per_key.len(),
        }
    }
}

/// Summary of a farming run.
#[derive(Debug, Clone)]
pub struct FarmingReport {
    pub total_clicks: usize,
    pub awarded: usize,
    pub rate_limited: usize,
    pub self_engagement: usize,
    pub duplicate_post: usize,
    pub duplicate_canonical: usize,
    pub points: u64,
    pub denial_rate: f64,
    pub unique_keys: usize,
}

impl std::fmt::Display for FarmingReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Farming Report ===")?;
        writeln!(f, "Total Clicks:        {}", self.total_clicks)?;
        writeln!(f, "Points Earned:       {}", self.points)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Awarded:             {}", self.awarded)?;
        writeln!(f, "Rate Limited:        {}", self.rate_limited)?;
        writeln!(f, "Self Engagement:     {}", self.self_engagement)?;
        writeln!(f, "Duplicate (post):    {}", self.duplicate_post)?;
        writeln!(f, "Duplicate (content): {}", self.duplicate_canonical)?;
        writeln!(f, "Denial Rate:         {:.1}%", self.denial_rate * 100.0)?;
        writeln!(f, "Unique Keys:         {}", self.unique_keys)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = FarmingMetrics::new();
        metrics.record(Outcome::Awarded, "10.0.0.1:a", 1);
        metrics.record(Outcome::DuplicatePost, "10.0.0.1:a", 0);
        metrics.record(Outcome::RateLimited, "10.0.0.2:b", 0);

        assert_eq!(metrics.total_clicks(), 3);
        assert_eq!(metrics.count(Outcome::Awarded), 1);
        let report = metrics.report();
        assert_eq!(report.points, 1);
        assert_eq!(report.unique_keys, 2);
    }

    #[test]
    fn test_denial_rate() {
        let mut metrics = FarmingMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Awarded, "k", 1);
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "k", 0);
        }

        assert!((metrics.denial_rate() - 0.7).abs() < 0.01);
    }
}
