//! Report rendering: plain text, Markdown, and JSON.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::{AggregatedStatistics, WorkStyle};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Plain text.
    Text,
    /// Markdown document.
    Markdown,
    /// Structured JSON.
    Json,
}

/// The analyzed time range, rendered as calendar dates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRange {
    /// First day of the window.
    pub from: String,
    /// Last day of the window.
    pub to: String,
}

/// Everything a renderer needs to produce the final document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Analysis type identifier (`profile`, `experience`, `techstack`).
    pub analysis_type: String,
    /// Human-readable report title for the chosen analysis type.
    #[serde(skip)]
    pub title: String,
    /// The analyzed time range.
    pub time_range: TimeRange,
    /// Locally computed statistics.
    pub statistics: AggregatedStatistics,
    /// Derived work-style metrics.
    pub work_style: WorkStyle,
    /// Analysis text returned by the generation service.
    pub ai_analysis: String,
    /// When this report was produced.
    pub generated_at: DateTime<Utc>,
}

/// Report generator writing one of the supported formats to an output sink.
pub struct Generator<W: Write> {
    format: Format,
    output: W,
}

impl<W: Write> Generator<W> {
    /// Creates a generator for the given format and output sink.
    pub fn new(format: Format, output: W) -> Self {
        Self { format, output }
    }

    /// Renders the report in the configured format.
    pub fn generate(&mut self, report: &Report) -> Result<()> {
        match self.format {
            Format::Text => self.generate_text(report),
            Format::Markdown => self.generate_markdown(report),
            Format::Json => self.generate_json(report),
        }
    }

    fn generate_text(&mut self, report: &Report) -> Result<()> {
        let out = &mut self.output;

        writeln!(out, "{}", report.title)?;
        writeln!(
            out,
            "Time range: {} to {}",
            report.time_range.from, report.time_range.to
        )?;
        writeln!(out, "==================================")?;
        writeln!(out)?;

        writeln!(out, "## Statistics")?;
        writeln!(out, "- Total commits: {}", report.statistics.total_commits)?;
        writeln!(out, "- Repositories: {}", report.statistics.total_repos)?;
        writeln!(out, "- Files changed: {}", report.statistics.total_files)?;
        writeln!(out)?;

        writeln!(out, "## AI Analysis")?;
        writeln!(out, "{}", report.ai_analysis)?;
        writeln!(out)?;

        Ok(())
    }

    fn generate_markdown(&mut self, report: &Report) -> Result<()> {
        let out = &mut self.output;

        writeln!(out, "# {}\n", report.title)?;
        writeln!(
            out,
            "**Time range**: {} to {}\n",
            report.time_range.from, report.time_range.to
        )?;
        writeln!(
            out,
            "**Generated at**: {}\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        )?;

        writeln!(out, "## 📊 Statistics\n")?;
        writeln!(out, "- **Total commits**: {}", report.statistics.total_commits)?;
        writeln!(out, "- **Repositories**: {}", report.statistics.total_repos)?;
        writeln!(out, "- **Files changed**: {}", report.statistics.total_files)?;

        if !report.statistics.file_types.is_empty() {
            writeln!(out, "- **File type distribution**:")?;
            for (ext, count) in &report.statistics.file_types {
                writeln!(out, "  - `{ext}`: {count}")?;
            }
        }

        if !report.statistics.repo_stats.is_empty() {
            writeln!(out, "- **Commits per repository**:")?;
            for (repo, count) in &report.statistics.repo_stats {
                writeln!(out, "  - {repo}: {count}")?;
            }
        }

        if !report.statistics.commits_by_month.is_empty() {
            writeln!(out, "- **Monthly activity**:")?;
            for (month, count) in &report.statistics.commits_by_month {
                writeln!(out, "  - {month}: {count}")?;
            }
        }

        writeln!(out, "- **Work style**:")?;
        writeln!(
            out,
            "  - Average commits per day: {:.2}",
            report.work_style.avg_commits_per_day
        )?;
        if let Some(hour) = report.work_style.most_active_hour {
            writeln!(out, "  - Most active hour: {hour:02}:00")?;
        }
        writeln!(
            out,
            "  - Average message length: {:.0} characters",
            report.work_style.avg_message_length
        )?;
        writeln!(out)?;

        writeln!(out, "## 🤖 AI Analysis\n")?;
        writeln!(out, "{}", report.ai_analysis)?;
        writeln!(out)?;

        writeln!(out, "---")?;
        writeln!(out, "*Generated by git-profile*")?;

        Ok(())
    }

    fn generate_json(&mut self, report: &Report) -> Result<()> {
        serde_json::to_writer_pretty(&mut self.output, report)
            .context("failed to serialize report to JSON")?;
        writeln!(self.output)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_report() -> Report {
        let mut statistics = AggregatedStatistics::default();
        statistics.total_commits = 5;
        statistics.total_repos = 2;
        statistics.total_files = 7;
        statistics.file_types.insert(".rs".to_string(), 6);
        statistics.repo_stats.insert("repo-a".to_string(), 3);
        statistics.repo_stats.insert("repo-b".to_string(), 2);
        statistics.commits_by_month.insert("2024-01".to_string(), 5);
        statistics.commits_by_hour.insert(14, 5);

        Report {
            analysis_type: "profile".to_string(),
            title: "Developer Profile Report".to_string(),
            time_range: TimeRange {
                from: "2024-01-01".to_string(),
                to: "2024-01-31".to_string(),
            },
            statistics,
            work_style: WorkStyle {
                avg_commits_per_day: 0.16,
                most_active_hour: Some(14),
                avg_message_length: 32.0,
            },
            ai_analysis: "Consistent backend work in Rust.".to_string(),
            generated_at: Utc.with_ymd_and_hms(2024, 2, 1, 10, 0, 0).unwrap(),
        }
    }

    fn render(format: Format) -> String {
        let mut buf = Vec::new();
        Generator::new(format, &mut buf)
            .generate(&sample_report())
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_report_contains_statistics_and_analysis() {
        let text = render(Format::Text);

        assert!(text.starts_with("Developer Profile Report\n"));
        assert!(text.contains("- Total commits: 5"));
        assert!(text.contains("- Repositories: 2"));
        assert!(text.contains("Consistent backend work in Rust."));
    }

    #[test]
    fn markdown_report_contains_distribution_and_footer() {
        let md = render(Format::Markdown);

        assert!(md.starts_with("# Developer Profile Report\n"));
        assert!(md.contains("**Time range**: 2024-01-01 to 2024-01-31"));
        assert!(md.contains("  - `.rs`: 6"));
        assert!(md.contains("  - repo-a: 3"));
        assert!(md.contains("  - Most active hour: 14:00"));
        assert!(md.contains("*Generated by git-profile*"));
    }

    #[test]
    fn json_report_round_trips() {
        let json = render(Format::Json);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["analysis_type"], "profile");
        assert_eq!(parsed["statistics"]["total_commits"], 5);
        assert_eq!(parsed["time_range"]["from"], "2024-01-01");
        assert_eq!(parsed["work_style"]["most_active_hour"], 14);

        let report: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(report.statistics, sample_report().statistics);
    }
}
