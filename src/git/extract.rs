//! Two-phase commit extraction from a single working copy.
//!
//! Phase 1 walks the revision graph once and filters candidates by time
//! window and author. Phase 2 runs the per-commit detail queries (branch
//! membership, changed-file list), which dominate the cost of extraction.

use std::path::Path;

use anyhow::{ensure, Context, Result};
use chrono::{DateTime, Duration, Months, NaiveDate, NaiveTime, TimeZone, Utc};
use git2::{BranchType, Oid, Repository, Sort};
use tracing::warn;

use crate::git::commit::{author_date, CommitRecord};

/// Inclusive `[from, to]` instant range used to filter commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    /// Start of the window.
    pub from: DateTime<Utc>,
    /// End of the window, inclusive.
    pub to: DateTime<Utc>,
}

impl TimeWindow {
    /// Builds a window from two calendar dates.
    ///
    /// `from` starts at midnight and `to` is adjusted to end-of-day
    /// (23:59:59) so commits made any time on the final day are included.
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Result<Self> {
        ensure!(from <= to, "invalid time range: {from} is after {to}");

        let from = Utc.from_utc_datetime(&from.and_time(NaiveTime::MIN));
        let to = Utc.from_utc_datetime(&to.and_time(NaiveTime::MIN)) + Duration::days(1)
            - Duration::seconds(1);

        Ok(Self { from, to })
    }

    /// Builds a window covering the last `months` calendar months up to now.
    pub fn last_months(months: u32) -> Self {
        let now = Utc::now();
        Self {
            from: now - Months::new(months),
            to: now,
        }
    }

    /// Whether the given instant falls inside the window.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.from <= instant && instant <= self.to
    }

    /// Number of days spanned by the window, never less than 1.
    ///
    /// Used as the denominator for per-day averages so that a single-day
    /// window does not divide by zero.
    pub fn days(&self) -> i64 {
        (self.to - self.from).num_days().max(1)
    }
}

/// Extracts commits from the working copy at `path`, most-recent-first.
///
/// Commits are restricted to those whose author date falls inside `window`.
/// When `author` is given, only commits whose author name matches exactly
/// (case-sensitive) are returned; `None` means all authors.
///
/// Individual commits that fail their detail query or carry an unparseable
/// timestamp are skipped with a warning rather than aborting extraction.
pub fn extract_commits(
    path: &Path,
    author: Option<&str>,
    window: &TimeWindow,
) -> Result<Vec<CommitRecord>> {
    let repo = Repository::open(path)
        .with_context(|| format!("failed to open git repository at {}", path.display()))?;

    let branch_tips = local_branch_tips(&repo)?;

    // Phase 1: one time-sorted walk over all local branch tips.
    let mut walk = repo.revwalk().context("failed to create revision walk")?;
    walk.set_sorting(Sort::TIME)
        .context("failed to set revision walk ordering")?;

    if branch_tips.is_empty() {
        // No local branches (e.g. detached HEAD in a fresh clone): fall back
        // to walking from HEAD when one exists.
        if let Ok(head) = repo.head() {
            if let Some(target) = head.target() {
                walk.push(target).context("failed to push HEAD commit")?;
            }
        }
    } else {
        for (name, tip) in &branch_tips {
            walk.push(*tip)
                .with_context(|| format!("failed to push branch {name}"))?;
        }
    }

    let mut records = Vec::new();

    for oid in walk {
        let oid = match oid {
            Ok(oid) => oid,
            Err(e) => {
                warn!(repo = %path.display(), error = %e, "skipping unreadable commit");
                continue;
            }
        };

        let commit = match repo.find_commit(oid) {
            Ok(commit) => commit,
            Err(e) => {
                warn!(commit = %oid, error = %e, "skipping commit: lookup failed");
                continue;
            }
        };

        let Some(date) = author_date(&commit) else {
            warn!(commit = %oid, "skipping commit: invalid timestamp");
            continue;
        };

        if !window.contains(date.with_timezone(&Utc)) {
            continue;
        }

        if let Some(name) = author {
            if commit.author().name() != Some(name) {
                continue;
            }
        }

        // Phase 2: per-commit detail queries.
        match CommitRecord::from_git_commit(&repo, &commit, &branch_tips) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(commit = %oid, error = %e, "skipping commit: detail query failed");
            }
        }
    }

    // Ordering is a contract, not an artifact of the walk: the walk is
    // commit-time sorted while filtering uses author dates.
    records.sort_by(|a, b| b.date.cmp(&a.date));

    Ok(records)
}

/// Names and tip ids of all local branches.
fn local_branch_tips(repo: &Repository) -> Result<Vec<(String, Oid)>> {
    let mut tips = Vec::new();

    let branches = repo
        .branches(Some(BranchType::Local))
        .context("failed to list local branches")?;

    for branch in branches {
        let (branch, _) = branch.context("failed to read branch")?;

        let Some(name) = branch.name().context("failed to read branch name")? else {
            continue;
        };

        if let Some(tip) = branch.get().target() {
            tips.push((name.to_string(), tip));
        }
    }

    Ok(tips)
}
