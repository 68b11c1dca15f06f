use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::{NaiveDate, TimeZone, Utc};
use git2::{Oid, Repository, Signature, Time};
use tempfile::TempDir;

use git_profile::git::{discover_repositories, extract_commits, TimeWindow};
use git_profile::profile::{AggregatedStatistics, WorkStyle};

/// Test setup that creates a temporary git repository with commits at
/// controlled author timestamps.
struct TestRepo {
    _temp_dir: TempDir,
    repo_path: PathBuf,
    repo: Repository,
    commits: Vec<Oid>,
}

impl TestRepo {
    fn new() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo_path = temp_dir.path().to_path_buf();

        let repo = Repository::init(&repo_path)?;

        let mut config = repo.config()?;
        config.set_str("user.name", "Test User")?;
        config.set_str("user.email", "test@example.com")?;

        Ok(TestRepo {
            _temp_dir: temp_dir,
            repo_path,
            repo,
            commits: Vec::new(),
        })
    }

    fn signature(author: &str, when: i64) -> Result<Signature<'static>> {
        let email = format!("{}@example.com", author.to_lowercase());
        Ok(Signature::new(author, &email, &Time::new(when, 0))?)
    }

    /// Commits the given files on HEAD with a fixed author timestamp.
    fn add_commit(
        &mut self,
        author: &str,
        when: i64,
        message: &str,
        files: &[(&str, &str)],
    ) -> Result<Oid> {
        for (path, content) in files {
            let file_path = self.repo_path.join(path);
            if let Some(parent) = file_path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&file_path, content)?;
        }

        let mut index = self.repo.index()?;
        for (path, _) in files {
            index.add_path(Path::new(path))?;
        }
        index.write()?;

        let signature = Self::signature(author, when)?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let parent_commit = match self.commits.last() {
            Some(id) => Some(self.repo.find_commit(*id)?),
            None => None,
        };
        let parents: Vec<&git2::Commit> = parent_commit.iter().collect();

        let commit_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        self.commits.push(commit_id);
        Ok(commit_id)
    }

    /// Creates a merge commit on HEAD joining the current tip with `other`.
    fn add_merge_commit(&mut self, author: &str, when: i64, other: Oid) -> Result<Oid> {
        let head = self
            .repo
            .find_commit(*self.commits.last().expect("no commits yet"))?;
        let other = self.repo.find_commit(other)?;
        let signature = Self::signature(author, when)?;
        let tree = head.tree()?;

        let commit_id = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            "Merge branch",
            &tree,
            &[&head, &other],
        )?;

        self.commits.push(commit_id);
        Ok(commit_id)
    }

    fn current_branch(&self) -> Result<String> {
        Ok(self
            .repo
            .head()?
            .shorthand()
            .unwrap_or("HEAD")
            .to_string())
    }
}

fn ts(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp()
}

fn january_2024() -> TimeWindow {
    TimeWindow::from_dates(
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
    )
    .unwrap()
}

#[test]
fn author_filter_returns_exactly_matching_commits() -> Result<()> {
    let mut repo = TestRepo::new()?;

    repo.add_commit("alice", ts(2024, 1, 5, 10), "add core", &[("core.rs", "a")])?;
    repo.add_commit("bob", ts(2024, 1, 6, 11), "add docs", &[("README.md", "b")])?;
    repo.add_commit("alice", ts(2024, 1, 10, 9), "fix core", &[("core.rs", "a2")])?;
    repo.add_commit("bob", ts(2024, 1, 12, 15), "tweak docs", &[("README.md", "b2")])?;
    repo.add_commit("alice", ts(2024, 1, 20, 22), "add tests", &[("tests.rs", "t")])?;

    let commits = extract_commits(&repo.repo_path, Some("alice"), &january_2024())?;

    assert_eq!(commits.len(), 3);
    assert!(commits.iter().all(|c| c.author == "alice"));

    // Most-recent-first ordering.
    let dates: Vec<_> = commits.iter().map(|c| c.date).collect();
    let mut sorted = dates.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(dates, sorted);

    // Case-sensitive, exact matching: "Alice" is not "alice".
    let commits = extract_commits(&repo.repo_path, Some("Alice"), &january_2024())?;
    assert!(commits.is_empty());

    Ok(())
}

#[test]
fn extraction_respects_window_and_is_stable() -> Result<()> {
    let mut repo = TestRepo::new()?;

    repo.add_commit("alice", ts(2023, 12, 30, 10), "too early", &[("a.rs", "1")])?;
    repo.add_commit("alice", ts(2024, 1, 1, 0), "first day", &[("b.rs", "2")])?;
    repo.add_commit("alice", ts(2024, 1, 31, 23), "last day", &[("c.rs", "3")])?;
    repo.add_commit("alice", ts(2024, 2, 1, 1), "too late", &[("d.rs", "4")])?;

    let first = extract_commits(&repo.repo_path, None, &january_2024())?;

    assert_eq!(first.len(), 2);
    assert_eq!(first[0].message.trim(), "last day");
    assert_eq!(first[1].message.trim(), "first day");

    // Re-running against an unchanged repository yields the identical
    // sequence.
    let second = extract_commits(&repo.repo_path, None, &january_2024())?;
    let hashes = |commits: &[git_profile::git::CommitRecord]| {
        commits.iter().map(|c| c.hash.clone()).collect::<Vec<_>>()
    };
    assert_eq!(hashes(&first), hashes(&second));

    Ok(())
}

#[test]
fn zero_commits_in_range_is_empty_not_an_error() -> Result<()> {
    let mut repo = TestRepo::new()?;
    repo.add_commit("alice", ts(2022, 6, 1, 12), "old work", &[("a.rs", "1")])?;

    let commits = extract_commits(&repo.repo_path, None, &january_2024())?;
    assert!(commits.is_empty());

    let stats = AggregatedStatistics::from_commits(&commits);
    assert_eq!(stats.total_commits, 0);
    assert_eq!(stats.total_repos, 0);
    assert_eq!(stats.total_files, 0);

    let style = WorkStyle::from_commits(&commits, &january_2024());
    assert_eq!(style.avg_commits_per_day, 0.0);

    Ok(())
}

#[test]
fn changed_files_and_branches_are_recorded() -> Result<()> {
    let mut repo = TestRepo::new()?;

    repo.add_commit(
        "alice",
        ts(2024, 1, 5, 10),
        "multi-file change",
        &[("x.go", "x"), ("y.go", "y"), ("z.js", "z")],
    )?;
    let branch_name = repo.current_branch()?;

    let commits = extract_commits(&repo.repo_path, None, &january_2024())?;

    assert_eq!(commits.len(), 1);
    assert_eq!(commits[0].changed_files, vec!["x.go", "y.go", "z.js"]);
    assert!(commits[0].branches.contains(&branch_name));

    let records = commits;
    let stats = AggregatedStatistics::from_commits(&records);
    assert_eq!(stats.file_types.get(".go"), Some(&2));
    assert_eq!(stats.file_types.get(".js"), Some(&1));

    Ok(())
}

#[test]
fn merge_commits_report_no_changed_files() -> Result<()> {
    let mut repo = TestRepo::new()?;

    let base = repo.add_commit("alice", ts(2024, 1, 2, 10), "base", &[("a.rs", "1")])?;
    // A side branch commit forked from base.
    let side_sig = TestRepo::signature("alice", ts(2024, 1, 3, 10))?;
    let base_commit = repo.repo.find_commit(base)?;
    let side = repo.repo.commit(
        Some("refs/heads/side"),
        &side_sig,
        &side_sig,
        "side work",
        &base_commit.tree()?,
        &[&base_commit],
    )?;
    // Release the immutable borrow of `repo.repo` before the mutable
    // `repo` method calls below (the git2::Commit otherwise lives to end
    // of scope via Drop).
    drop(base_commit);
    repo.add_commit("alice", ts(2024, 1, 4, 10), "mainline", &[("b.rs", "2")])?;
    repo.add_merge_commit("alice", ts(2024, 1, 5, 10), side)?;

    let commits = extract_commits(&repo.repo_path, None, &january_2024())?;

    let merge = commits
        .iter()
        .find(|c| c.message.starts_with("Merge"))
        .expect("merge commit missing");
    assert!(merge.changed_files.is_empty());

    // The side commit is reachable from both branch tips.
    let side_record = commits
        .iter()
        .find(|c| c.message.trim() == "side work")
        .expect("side commit missing");
    assert!(side_record.branches.contains(&"side".to_string()));

    Ok(())
}

#[test]
fn discovery_and_merge_across_repositories() -> Result<()> {
    let temp = tempfile::tempdir()?;
    let root = temp.path();

    let mut repo_a = TestRepo::new()?;
    repo_a.add_commit("alice", ts(2024, 1, 5, 10), "a1", &[("a.rs", "1")])?;
    repo_a.add_commit("alice", ts(2024, 1, 6, 10), "a2", &[("a.rs", "2")])?;

    let mut repo_b = TestRepo::new()?;
    repo_b.add_commit("bob", ts(2024, 1, 7, 10), "b1", &[("b.go", "1")])?;

    // Move both working copies under one discovery root.
    copy_dir(&repo_a.repo_path, &root.join("repo-a"))?;
    copy_dir(&repo_b.repo_path, &root.join("repo-b"))?;

    let discovered = discover_repositories(root)?;
    assert_eq!(
        discovered,
        vec![root.join("repo-a"), root.join("repo-b")]
    );

    let window = january_2024();
    let mut all = Vec::new();
    for path in &discovered {
        let mut commits = extract_commits(path, None, &window)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        for commit in &mut commits {
            commit.repo_path = name.clone();
        }
        all.extend(commits);
    }
    all.sort_by(|a, b| b.date.cmp(&a.date));

    let stats = AggregatedStatistics::from_commits(&all);

    assert_eq!(stats.total_commits, 3);
    assert_eq!(stats.total_repos, 2);
    assert_eq!(stats.repo_stats.get("repo-a"), Some(&2));
    assert_eq!(stats.repo_stats.get("repo-b"), Some(&1));
    assert_eq!(stats.repo_stats.values().sum::<usize>(), stats.total_commits);

    Ok(())
}

// Minimal recursive directory copy so the fixture repositories can be laid
// out under a single discovery root.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let target = dst.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
