//! Prompt templates and assembly for the Gemini API.
//!
//! The commit listing, repository count, and file-type tally rendered here
//! are the only transformations of commit data destined for the generation
//! call; the surrounding template text is interchangeable per analysis type
//! or replaceable wholesale with `--prompt-file`.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{ensure, Context, Result};

use crate::git::{CommitRecord, TimeWindow, SHORT_HASH_LEN};
use crate::profile::AggregatedStatistics;

/// Maximum number of changed files listed per commit in the prompt.
const MAX_FILES_PER_COMMIT: usize = 10;

/// The kind of analysis requested, selecting a prompt template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptType {
    /// Developer profile: tech stack, work style, and core strengths.
    DeveloperProfile,
    /// Project experience summary suitable for a resume.
    ProjectExperience,
    /// Tech stack breakdown with proficiency estimates.
    TechStack,
}

impl PromptType {
    /// Stable identifier used in the report envelope.
    pub fn name(self) -> &'static str {
        match self {
            Self::DeveloperProfile => "profile",
            Self::ProjectExperience => "experience",
            Self::TechStack => "techstack",
        }
    }

    /// Human-readable report title.
    pub fn title(self) -> &'static str {
        match self {
            Self::DeveloperProfile => "Developer Profile Report",
            Self::ProjectExperience => "Project Experience Report",
            Self::TechStack => "Tech Stack Analysis Report",
        }
    }

    /// The built-in prompt template for this analysis type.
    pub fn template(self) -> &'static str {
        match self {
            Self::DeveloperProfile => DEVELOPER_PROFILE_TEMPLATE,
            Self::ProjectExperience => PROJECT_EXPERIENCE_TEMPLATE,
            Self::TechStack => TECH_STACK_TEMPLATE,
        }
    }
}

const DEVELOPER_PROFILE_TEMPLATE: &str = r"You are a professional technical talent analyst. Based on the following git commit history, write a developer profile report.

Commit history:
{{commit_log}}

Statistics:
- Total commits: {{total_commits}}
- Time range analyzed: {{time_range}}
- Repositories involved: {{repo_count}}
- File types touched: {{file_types}}

Analyze the developer's technology stack, working style, areas of expertise, and core strengths. Ground every claim in the commit data above.";

const PROJECT_EXPERIENCE_TEMPLATE: &str = r"You are a professional resume consultant. Based on the following git commit history, summarize the project experience it demonstrates.

Commit history:
{{commit_log}}

Statistics:
- Total commits: {{total_commits}}
- Time range analyzed: {{time_range}}
- Repositories involved: {{repo_count}}
- File types touched: {{file_types}}

Describe, per project, what was built, the role the commits suggest, and the concrete outcomes. Write in a tone suitable for a resume's project-experience section.";

const TECH_STACK_TEMPLATE: &str = r"You are a senior software architect. Based on the following git commit history, produce a technology stack breakdown.

Commit history:
{{commit_log}}

Statistics:
- Total commits: {{total_commits}}
- Time range analyzed: {{time_range}}
- Repositories involved: {{repo_count}}
- File types touched: {{file_types}}

Identify the languages, frameworks, and tools in use, estimate relative proficiency from the volume and nature of the changes, and note any notable gaps.";

/// Builds the final prompt by substituting commit data and aggregated
/// statistics into `template`.
pub fn build_prompt(
    template: &str,
    commits: &[CommitRecord],
    stats: &AggregatedStatistics,
    window: &TimeWindow,
) -> String {
    let time_range = format!(
        "{} to {}",
        window.from.format("%Y-%m-%d"),
        window.to.format("%Y-%m-%d")
    );

    template
        .replace("{{commit_log}}", &render_commit_log(commits))
        .replace("{{total_commits}}", &stats.total_commits.to_string())
        .replace("{{time_range}}", &time_range)
        .replace("{{repo_count}}", &stats.total_repos.to_string())
        .replace("{{file_types}}", &file_type_summary(stats))
}

/// Renders the commit sequence as plain text for the prompt.
///
/// Each commit lists at most [`MAX_FILES_PER_COMMIT`] changed files; longer
/// lists end with an explicit "... and N more files" marker.
pub fn render_commit_log(commits: &[CommitRecord]) -> String {
    let mut log = String::new();

    for (i, commit) in commits.iter().enumerate() {
        let short_hash = &commit.hash[..commit.hash.len().min(SHORT_HASH_LEN)];

        let _ = writeln!(log, "Commit {}:", i + 1);
        let _ = writeln!(log, "- Hash: {short_hash}");
        let _ = writeln!(log, "- Author: {}", commit.author);
        let _ = writeln!(log, "- Date: {}", commit.date.format("%Y-%m-%d %H:%M:%S"));

        if !commit.repo_path.is_empty() {
            let _ = writeln!(log, "- Repository: {}", commit.repo_path);
        }

        if !commit.branches.is_empty() {
            let _ = writeln!(log, "- Branches: {}", commit.branches.join(", "));
        }

        let _ = writeln!(log, "- Message: {}", commit.message.trim_end());

        if !commit.changed_files.is_empty() {
            let _ = writeln!(log, "- Changed files:");
            for file in commit.changed_files.iter().take(MAX_FILES_PER_COMMIT) {
                let _ = writeln!(log, "  * {file}");
            }
            if commit.changed_files.len() > MAX_FILES_PER_COMMIT {
                let _ = writeln!(
                    log,
                    "  * ... and {} more files",
                    commit.changed_files.len() - MAX_FILES_PER_COMMIT
                );
            }
        }

        log.push('\n');
    }

    log
}

/// Compact file-type tally, e.g. `.go(12) .rs(3)`.
pub fn file_type_summary(stats: &AggregatedStatistics) -> String {
    let mut summary = String::new();

    for (ext, count) in &stats.file_types {
        let _ = write!(summary, "{ext}({count}) ");
    }

    summary.trim_end().to_string()
}

/// Loads a custom prompt template from a file.
///
/// The template must be non-empty; a trailing newline is ensured so the
/// substituted commit data never runs into the template's last line.
pub fn load_custom_template(path: &Path) -> Result<String> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read prompt template {}", path.display()))?;

    let content = content.trim();
    ensure!(
        !content.is_empty(),
        "prompt template {} is empty",
        path.display()
    );

    let mut template = content.to_string();
    template.push('\n');

    Ok(template)
}
