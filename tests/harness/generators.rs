// SPDX-FileCopyrightText: 2026 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test data generators for farming simulation.

use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of IP addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// Generate farmer usernames.
pub fn generate_usernames(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("farmer-{}", i)).collect()
}

/// Generate `count` share URLs that all canonicalize to YouTube video
/// `video_id`, varying host, shortener and tracking parameters.
pub fn generate_share_variants(video_id: &str, count: usize) -> Vec<String> {
    (0..count)
        .map(|i| match i % 4 {
            0 => format!("https://www.youtube.com/watch?v={}", video_id),
            1 => format!("https://youtu.be/{}?si=share{}", video_id, i),
            2 => format!(
                "https://m.youtube.com/watch?v={}&utm_source=farm&utm_campaign={}",
                video_id, i
            ),
            _ => format!("https://www.youtube.com/watch?v={}&t={}&feature=share", video_id, i),
        })
        .collect()
}

/// Malformed or unsafe redirect targets.
pub fn generate_malformed_urls() -> Vec<&'static str> {
    vec![
        "",
        "not-a-url",
        "javascript:alert(1)",
        "data:text/html,<script>alert(1)</script>",
        "file:///etc/passwd",
        "ftp://files.example.com/",
        "//youtube.com/watch?v=a",
        "https://",
    ]
}

/// Hosts that look like allowlisted ones but are not.
pub fn generate_lookalike_hosts() -> Vec<&'static str> {
    vec![
        "https://notyoutube.com/watch?v=a",
        "https://youtube.com.evil.example/watch?v=a",
        "https://tiktok.co/@a/video/1",
        "https://xcom.example/a",
        "https://evil.example/?next=https://youtube.com",
    ]
}
