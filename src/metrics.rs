//! Metrics describing a counting pass.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Summary of a single order after counting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderMetrics {
    /// N-gram order (1-based).
    pub order: usize,
    /// Number of distinct n-grams.
    pub unique: usize,
    /// Number of n-gram occurrences.
    pub total: u64,
}

/// Aggregate metrics produced by a counting session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CountingMetrics {
    /// Number of sentences (input lines) scanned.
    pub sentences: usize,
    /// Number of corpus tokens scanned, excluding sentence markers.
    pub tokens: usize,
    /// Per-order table sizes.
    pub orders: Vec<OrderMetrics>,
    /// Total duration of the counting pass.
    pub total_duration: Duration,
    /// Resident set size sample captured from `/proc/self/status` on Linux.
    pub rss_kb: Option<usize>,
}

impl CountingMetrics {
    /// Creates an empty metrics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sentences: 0,
            tokens: 0,
            orders: Vec::new(),
            total_duration: Duration::ZERO,
            rss_kb: None,
        }
    }

    /// Serialises the metrics as JSON.
    pub fn to_json(&self, pretty: bool) -> crate::Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

impl Default for CountingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_os = "linux")]
fn current_rss_kb() -> Option<usize> {
    use std::fs::File;
    use std::io::{BufRead, BufReader};

    let file = File::open("/proc/self/status").ok()?;
    for line in BufReader::new(file).lines().map_while(Result::ok) {
        if let Some(rest) = line.strip_prefix("VmRSS:") {
            let value = rest
                .split_whitespace()
                .find_map(|part| part.parse::<usize>().ok());
            return value;
        }
    }
    None
}

#[cfg(not(target_os = "linux"))]
fn current_rss_kb() -> Option<usize> {
    None
}

/// Samples the current resident set size (RSS) on supported platforms.
pub fn sample_rss_kb() -> Option<usize> {
    current_rss_kb()
}
