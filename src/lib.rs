//! # git-profile
//!
//! AI-assisted developer profile reports from git commit history.
//!
//! git-profile scans one or more git repositories, extracts commit history
//! over a time window, and produces an analytical report (developer profile,
//! project experience, or tech stack breakdown) by combining locally computed
//! statistics with analysis text from the Gemini API.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod ai;
pub mod cli;
pub mod git;
pub mod profile;
pub mod report;
pub mod utils;

pub use crate::cli::Cli;

/// The current version of git-profile.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
