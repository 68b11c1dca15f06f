//! CLI interface for git-profile

use anyhow::Result;
use clap::Parser;

pub mod report;

pub use report::ReportCommand;

/// git-profile: AI-assisted developer profile reports from git commit history
#[derive(Parser)]
#[command(name = "git-profile")]
#[command(about = "AI-assisted developer profile reports from git commit history", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Report generation options
    #[command(flatten)]
    pub report: ReportCommand,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        self.report.execute().await
    }
}
