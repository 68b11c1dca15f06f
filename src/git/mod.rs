//! Git operations: repository discovery and commit history extraction.

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;

pub mod commit;
pub mod discovery;
pub mod extract;

pub use commit::CommitRecord;
pub use discovery::discover_repositories;
pub use extract::{extract_commits, TimeWindow};

/// Number of hex characters to show in abbreviated commit hashes.
pub const SHORT_HASH_LEN: usize = 8;

/// Checks that the given path is a git working copy.
pub fn check_working_copy(path: &Path) -> Result<()> {
    Repository::open(path)
        .with_context(|| format!("not a git repository: {}", path.display()))?;
    Ok(())
}
