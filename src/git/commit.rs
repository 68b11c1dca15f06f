//! Normalized commit records extracted from git history.

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use git2::{Commit, Oid, Repository};
use serde::{Deserialize, Serialize};

/// One git commit, normalized for aggregation and prompt assembly.
///
/// Immutable after extraction except for `repo_path`, which is assigned when
/// commits from several repositories are merged into a single sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitRecord {
    /// Full SHA-1 hash of the commit.
    pub hash: String,
    /// Author signature name.
    pub author: String,
    /// Author date with the author's recorded UTC offset.
    pub date: DateTime<FixedOffset>,
    /// The commit message as written by the author.
    pub message: String,
    /// Local branches whose history contains this commit.
    pub branches: Vec<String>,
    /// Repository-relative paths touched by the commit, in diff order.
    /// Empty for merge commits.
    pub changed_files: Vec<String>,
    /// Owning repository, assigned after extraction when merging commits
    /// from multiple repositories.
    #[serde(default)]
    pub repo_path: String,
}

impl CommitRecord {
    /// Builds a record from a git2 commit, including the per-commit detail
    /// queries for branch membership and the changed-file list.
    pub fn from_git_commit(
        repo: &Repository,
        commit: &Commit,
        branch_tips: &[(String, Oid)],
    ) -> Result<Self> {
        let hash = commit.id().to_string();
        let author = commit.author().name().unwrap_or("Unknown").to_string();
        let date = author_date(commit).context("invalid commit timestamp")?;
        let message = commit.message().unwrap_or("").to_string();

        let branches = branches_containing(repo, commit.id(), branch_tips)?;
        let changed_files = changed_files(repo, commit)?;

        Ok(Self {
            hash,
            author,
            date,
            message,
            branches,
            changed_files,
            repo_path: String::new(),
        })
    }
}

/// Returns the author date of a commit with its recorded UTC offset, or
/// `None` when the timestamp cannot be represented.
pub fn author_date(commit: &Commit) -> Option<DateTime<FixedOffset>> {
    let when = commit.author().when();
    let offset = FixedOffset::east_opt(when.offset_minutes() * 60)
        .or_else(|| FixedOffset::east_opt(0))?;

    DateTime::from_timestamp(when.seconds(), 0).map(|utc| utc.with_timezone(&offset))
}

/// Names of the local branches whose history contains the given commit.
fn branches_containing(
    repo: &Repository,
    commit_id: Oid,
    branch_tips: &[(String, Oid)],
) -> Result<Vec<String>> {
    let mut branches = Vec::new();

    for (name, tip) in branch_tips {
        let contains = *tip == commit_id
            || repo
                .graph_descendant_of(*tip, commit_id)
                .with_context(|| format!("failed to check ancestry against branch {name}"))?;

        if contains {
            branches.push(name.clone());
        }
    }

    Ok(branches)
}

/// Repository-relative paths touched by the commit, in diff delta order.
///
/// Merge commits report no changed files; the file-level diff is only taken
/// against a single parent (or the empty tree for root commits).
fn changed_files(repo: &Repository, commit: &Commit) -> Result<Vec<String>> {
    if commit.parent_count() > 1 {
        return Ok(Vec::new());
    }

    let commit_tree = commit.tree().context("failed to get commit tree")?;

    let parent_tree = if commit.parent_count() > 0 {
        Some(
            commit
                .parent(0)
                .context("failed to get parent commit")?
                .tree()
                .context("failed to get parent tree")?,
        )
    } else {
        None
    };

    let diff = repo
        .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)
        .context("failed to diff commit against parent")?;

    let mut files = Vec::new();
    for delta in diff.deltas() {
        if let Some(path) = delta.new_file().path().and_then(|p| p.to_str()) {
            files.push(path.to_string());
        }
    }

    Ok(files)
}
