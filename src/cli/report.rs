//! Report command — the full discovery → extraction → aggregation →
//! generation → rendering run.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, ensure, Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Args, ValueEnum};
use tracing::warn;

use crate::ai::{prompts, GeminiClient, PromptType};
use crate::git::{self, discover_repositories, extract_commits, TimeWindow};
use crate::profile::{AggregatedStatistics, WorkStyle};
use crate::report::{Format, Generator, Report, TimeRange};

/// Analysis type selecting the prompt template and report title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AnalysisKind {
    /// Developer profile analysis.
    Profile,
    /// Project experience summary.
    Experience,
    /// Tech stack breakdown.
    Techstack,
}

impl AnalysisKind {
    fn prompt_type(self) -> PromptType {
        match self {
            Self::Profile => PromptType::DeveloperProfile,
            Self::Experience => PromptType::ProjectExperience,
            Self::Techstack => PromptType::TechStack,
        }
    }
}

/// Named time-range preset, resolved against the current instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RangePreset {
    /// Last 3 months.
    #[value(name = "3m")]
    ThreeMonths,
    /// Last 6 months.
    #[value(name = "6m")]
    SixMonths,
    /// Last year.
    #[value(name = "1y")]
    OneYear,
    /// Last 2 years.
    #[value(name = "2y")]
    TwoYears,
}

impl RangePreset {
    fn window(self) -> TimeWindow {
        match self {
            Self::ThreeMonths => TimeWindow::last_months(3),
            Self::SixMonths => TimeWindow::last_months(6),
            Self::OneYear => TimeWindow::last_months(12),
            Self::TwoYears => TimeWindow::last_months(24),
        }
    }
}

/// Report output format flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain text.
    Text,
    /// Markdown document.
    Markdown,
    /// Structured JSON.
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Text => Format::Text,
            OutputFormat::Markdown => Format::Markdown,
            OutputFormat::Json => Format::Json,
        }
    }
}

/// Report command options.
#[derive(Args)]
pub struct ReportCommand {
    /// Analysis type to run.
    #[arg(long, value_enum, default_value = "profile")]
    pub analysis: AnalysisKind,

    /// Start of a custom time range.
    #[arg(long, value_name = "YYYY-MM-DD", requires = "to")]
    pub from: Option<NaiveDate>,

    /// End of a custom time range (inclusive, covers the whole day).
    #[arg(long, value_name = "YYYY-MM-DD", requires = "from")]
    pub to: Option<NaiveDate>,

    /// Preset time range, used when no custom range is given.
    #[arg(long, value_enum, default_value = "6m")]
    pub range: RangePreset,

    /// Report output format.
    #[arg(long, value_enum, default_value = "markdown")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Analyze a single git repository at this path.
    #[arg(long, value_name = "PATH", conflicts_with = "repos")]
    pub repo: Option<PathBuf>,

    /// Discover and analyze every git repository under this directory.
    #[arg(long, value_name = "DIR")]
    pub repos: Option<PathBuf>,

    /// Generation model to use.
    #[arg(long, value_name = "NAME")]
    pub model: Option<String>,

    /// Only include commits by this author (exact, case-sensitive match).
    #[arg(long, value_name = "NAME")]
    pub author: Option<String>,

    /// Custom prompt template file, replacing the built-in template.
    #[arg(long = "prompt-file", value_name = "PATH")]
    pub prompt_file: Option<PathBuf>,
}

impl ReportCommand {
    /// Executes the report command.
    pub async fn execute(self) -> Result<()> {
        // Fail fast on a missing API key before any extraction work.
        let client = GeminiClient::new(self.model.clone())?;

        let window = self.resolve_window()?;
        println!(
            "📅 Time range: {} to {}",
            window.from.format("%Y-%m-%d"),
            window.to.format("%Y-%m-%d")
        );

        match &self.author {
            Some(author) => println!("👤 Filtering by author: {author}"),
            None => println!("👥 Including all authors"),
        }

        let (repo_paths, discovery_root) = self.resolve_repositories()?;
        println!("🔍 Processing {} repositories...", repo_paths.len());

        let mut all_commits = Vec::new();
        let mut succeeded = 0usize;

        for path in &repo_paths {
            let display = display_path(path, discovery_root.as_deref());
            println!("  📁 Analyzing {display}");

            match extract_commits(path, self.author.as_deref(), &window) {
                Ok(mut commits) => {
                    succeeded += 1;
                    println!("     Found {} commits", commits.len());
                    for commit in &mut commits {
                        commit.repo_path = display.clone();
                    }
                    all_commits.extend(commits);
                }
                Err(e) => {
                    warn!(repo = %path.display(), error = %e, "skipping repository: extraction failed");
                }
            }
        }

        ensure!(succeeded > 0, "extraction failed for every repository");

        if all_commits.is_empty() {
            println!(
                "No commits found between {} and {}.",
                window.from.format("%Y-%m-%d"),
                window.to.format("%Y-%m-%d")
            );
            return Ok(());
        }

        // Merged sequences from several repositories interleave; restore the
        // most-recent-first contract before aggregation and prompt assembly.
        all_commits.sort_by(|a, b| b.date.cmp(&a.date));

        let stats = AggregatedStatistics::from_commits(&all_commits);
        let work_style = WorkStyle::from_commits(&all_commits, &window);

        println!("📊 Commits per repository:");
        for (repo, count) in &stats.repo_stats {
            println!("  {repo}: {count}");
        }
        println!("  Total: {}", stats.total_commits);

        let prompt_type = self.analysis.prompt_type();
        let template = match &self.prompt_file {
            Some(path) => prompts::load_custom_template(path)?,
            None => prompt_type.template().to_string(),
        };
        let prompt = prompts::build_prompt(&template, &all_commits, &stats, &window);

        println!(
            "🤖 Generating {} with {}...",
            prompt_type.title(),
            client.model()
        );
        let ai_analysis = client.generate(&prompt).await.context("AI analysis failed")?;

        let report = Report {
            analysis_type: prompt_type.name().to_string(),
            title: prompt_type.title().to_string(),
            time_range: TimeRange {
                from: window.from.format("%Y-%m-%d").to_string(),
                to: window.to.format("%Y-%m-%d").to_string(),
            },
            statistics: stats,
            work_style,
            ai_analysis,
            generated_at: Utc::now(),
        };

        // The output file is only created once generation has succeeded, so
        // a fatal error never leaves a partial report behind.
        match &self.output {
            Some(path) => {
                let file = File::create(path)
                    .with_context(|| format!("failed to create output file {}", path.display()))?;
                Generator::new(self.format.into(), file).generate(&report)?;
                println!("✅ Report saved to {}", path.display());
            }
            None => {
                let stdout = io::stdout();
                Generator::new(self.format.into(), stdout.lock()).generate(&report)?;
            }
        }

        Ok(())
    }

    fn resolve_window(&self) -> Result<TimeWindow> {
        match (self.from, self.to) {
            (Some(from), Some(to)) => TimeWindow::from_dates(from, to),
            (None, None) => Ok(self.range.window()),
            // clap enforces the pairing; keep a clear message for API use.
            _ => bail!("--from and --to must be provided together"),
        }
    }

    /// Resolves the set of repositories to analyze, validating inputs before
    /// any extraction begins. Returns the discovery root alongside so
    /// progress output can show repository paths relative to it.
    fn resolve_repositories(&self) -> Result<(Vec<PathBuf>, Option<PathBuf>)> {
        match (&self.repo, &self.repos) {
            (None, Some(root)) => {
                let repos = discover_repositories(root)?;
                ensure!(
                    !repos.is_empty(),
                    "no git repositories found under {}",
                    root.display()
                );
                Ok((repos, Some(root.clone())))
            }
            (Some(path), None) => {
                git::check_working_copy(path)?;
                Ok((vec![path.clone()], None))
            }
            (None, None) => Ok((vec![PathBuf::from(".")], None)),
            (Some(_), Some(_)) => bail!("--repo and --repos are mutually exclusive"),
        }
    }
}

/// Repository path as shown to the user: relative to the discovery root when
/// one is in play, otherwise as given.
fn display_path(path: &Path, root: Option<&Path>) -> String {
    root.and_then(|root| path.strip_prefix(root).ok())
        .filter(|relative| !relative.as_os_str().is_empty())
        .unwrap_or(path)
        .display()
        .to_string()
}
