//! Recursive discovery of git working copies under a root directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use tracing::warn;

/// Finds every git working-copy root under `root`, recursively.
///
/// A directory containing a `.git` entry (directory or gitfile) is a
/// working-copy root and is not descended into, so a repository's own tree
/// is never scanned for nested repositories. Symlinked directories are not
/// followed, which keeps cyclic links from causing infinite recursion.
/// Unreadable directories are skipped with a warning.
///
/// Returns an empty (sorted) list when nothing is found; the caller decides
/// whether that is an error.
pub fn discover_repositories(root: &Path) -> Result<Vec<PathBuf>> {
    let metadata = fs::metadata(root)
        .with_context(|| format!("cannot access directory {}", root.display()))?;
    ensure!(metadata.is_dir(), "{} is not a directory", root.display());

    let mut found = Vec::new();
    visit(root, &mut found);
    found.sort();

    Ok(found)
}

fn visit(dir: &Path, found: &mut Vec<PathBuf>) {
    if dir.join(".git").exists() {
        found.push(dir.to_path_buf());
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(path = %dir.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        let path = entry.path();
        let file_type = match path.symlink_metadata() {
            Ok(metadata) => metadata.file_type(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if file_type.is_dir() && !file_type.is_symlink() {
            visit(&path, found);
        }
    }
}
