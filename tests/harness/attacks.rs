// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Farming patterns for abuse simulation.

/// Farming pattern configuration.
#[derive(Debug, Clone)]
pub struct FarmingConfig {
    /// Total number of redirect clicks
    pub total_clicks: usize,
    /// Number of client IPs the clicks are spread over
    pub unique_ips: usize,
    /// Number of accounts doing the clicking
    pub farmer_accounts: usize,
    /// Number of posts clicked, all sharing one piece of content
    pub reposts: usize,
    /// Distinct pieces of content; each gets `reposts` posts
    pub unique_contents: usize,
    /// Clicks made by the post owner on their own posts
    pub self_clicks: bool,
}

impl Default for FarmingConfig {
    fn default() -> Self {
        Self {
            total_clicks: 100,
            unique_ips: 1,
            farmer_accounts: 1,
            reposts: 1,
            unique_contents: 1,
            self_clicks: false,
        }
    }
}

/// Predefined farming patterns.
impl FarmingConfig {
    /// One account hammering one post from one IP.
    pub fn redirect_flood() -> Self {
        Self {
            total_clicks: 200,
            ..Default::default()
        }
    }

    /// Owner clicking their own posts.
    pub fn self_farming() -> Self {
        Self {
            total_clicks: 15,
            unique_contents: 5,
            self_clicks: true,
            ..Default::default()
        }
    }

    /// One account clicking many reposts of the same content with
    /// different tracking parameters.
    pub fn cross_post_farming() -> Self {
        Self {
            total_clicks: 12,
            reposts: 12,
            ..Default::default()
        }
    }

    /// Many accounts, each behind its own IP, clicking the same content.
    pub fn sybil_ring() -> Self {
        Self {
            total_clicks: 150,
            unique_ips: 50,
            farmer_accounts: 50,
            reposts: 3,
            ..Default::default()
        }
    }

    /// Upper bound on engage points the pattern can legitimately earn
    /// inside one dedup window.
    pub fn max_points(&self) -> u64 {
        if self.self_clicks {
            0
        } else {
            (self.farmer_accounts * self.unique_contents) as u64
        }
    }
}
