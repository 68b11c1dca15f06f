//! Statistics derived from a commit sequence.
//!
//! Aggregation is a pure function of the current run's records: no I/O and
//! no state carried between runs.

use std::collections::{BTreeMap, HashSet};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::git::{CommitRecord, TimeWindow};

/// Counters and histograms computed once per run from the commit sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedStatistics {
    /// Total number of commits.
    pub total_commits: usize,
    /// Number of distinct repositories contributing commits.
    pub total_repos: usize,
    /// Number of distinct changed file paths.
    pub total_files: usize,
    /// File extension to occurrence count.
    pub file_types: BTreeMap<String, usize>,
    /// Repository identifier to commit count.
    pub repo_stats: BTreeMap<String, usize>,
    /// "YYYY-MM" to commit count.
    pub commits_by_month: BTreeMap<String, usize>,
    /// Hour of day (0-23) to commit count.
    pub commits_by_hour: BTreeMap<u32, usize>,
}

impl AggregatedStatistics {
    /// Aggregates the given commit sequence.
    ///
    /// Month and hour buckets use the author date in the author's recorded
    /// timezone. Handles the empty sequence: all counts stay zero.
    pub fn from_commits(commits: &[CommitRecord]) -> Self {
        let mut stats = Self::default();
        let mut repos = HashSet::new();
        let mut files = HashSet::new();

        for commit in commits {
            if !commit.repo_path.is_empty() {
                *stats.repo_stats.entry(commit.repo_path.clone()).or_default() += 1;
                repos.insert(commit.repo_path.as_str());
            }

            for file in &commit.changed_files {
                files.insert(file.as_str());
                if let Some(ext) = file_extension(file) {
                    *stats.file_types.entry(ext.to_string()).or_default() += 1;
                }
            }

            let month = commit.date.format("%Y-%m").to_string();
            *stats.commits_by_month.entry(month).or_default() += 1;
            *stats.commits_by_hour.entry(commit.date.hour()).or_default() += 1;
        }

        stats.total_commits = commits.len();
        stats.total_repos = repos.len();
        stats.total_files = files.len();

        stats
    }
}

/// Work-style metrics computed over the requested time window.
///
/// The denominator is the window span, not the span covered by commits, so
/// a short-but-dense history is not scaled as if it filled the window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkStyle {
    /// Average commits per day over the window.
    pub avg_commits_per_day: f64,
    /// Hour of day with the most commits, if any commits exist.
    pub most_active_hour: Option<u32>,
    /// Average commit message length in bytes.
    pub avg_message_length: f64,
}

impl WorkStyle {
    /// Derives work-style metrics from the commit sequence and the window
    /// that was requested for extraction.
    pub fn from_commits(commits: &[CommitRecord], window: &TimeWindow) -> Self {
        if commits.is_empty() {
            return Self::default();
        }

        let mut hours: BTreeMap<u32, usize> = BTreeMap::new();
        let mut message_bytes = 0usize;

        for commit in commits {
            *hours.entry(commit.date.hour()).or_default() += 1;
            message_bytes += commit.message.len();
        }

        // Ties resolve to the earliest hour; BTreeMap iteration makes the
        // choice deterministic.
        let mut most_active_hour = None;
        let mut max_count = 0;
        for (hour, count) in &hours {
            if *count > max_count {
                max_count = *count;
                most_active_hour = Some(*hour);
            }
        }

        Self {
            avg_commits_per_day: commits.len() as f64 / window.days() as f64,
            most_active_hour,
            avg_message_length: message_bytes as f64 / commits.len() as f64,
        }
    }
}

/// Derives a file extension from a repository-relative path.
///
/// The extension is everything from the last `.` of the final path segment
/// to the end, including the dot. Paths whose final segment has no `.`, and
/// dotfiles whose only `.` is the leading one, have no usable extension.
pub fn file_extension(path: &str) -> Option<&str> {
    let segment = path.rsplit('/').next().unwrap_or(path);

    match segment.rfind('.') {
        None | Some(0) => None,
        Some(idx) => Some(&segment[idx..]),
    }
}
