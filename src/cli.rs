//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Korrektor - grading annotation tally
///
/// Reads the `korrektur.txt` review of every student directory in an
/// assignment, computes the points from its `~(...)` annotations, appends
/// the total to the review and renders score statistics for the cohort.
///
/// Examples:
///   korrektor blatt03
///   korrektor blatt03 --dry-run
///   korrektor blatt03 --format markdown --output blatt03/statistics.md
///   korrektor --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Directory containing one subdirectory per student
    #[arg(value_name = "ASSIGNMENTS_DIR", required_unless_present = "init_config")]
    pub assignments: Option<PathBuf>,

    /// File listing directory names to skip, one per line
    ///
    /// Defaults to BLACKLIST in the current directory.
    #[arg(long, value_name = "FILE")]
    pub blacklist: Option<PathBuf>,

    /// Name of the review file inside each student directory
    #[arg(long, value_name = "NAME")]
    pub review_file: Option<String>,

    /// Output file for the statistics report
    ///
    /// Defaults to statistics.pdf inside the assignments directory.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Report format (pdf, markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Number of histogram bins per exercise
    #[arg(long, value_name = "COUNT")]
    pub bins: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .korrektor.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Trace every student while parsing
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Compute and print totals without touching any file
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the statistics report
    #[arg(long)]
    pub no_statistics: bool,

    /// Generate a default .korrektor.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the statistics report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Box plots and histograms (default)
    #[default]
    Pdf,
    /// Markdown tables
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.bins == Some(0) {
            return Err("Bins must be at least 1".to_string());
        }

        if let Some(ref name) = self.review_file {
            if name.is_empty() || name.contains(['/', '\\']) {
                return Err(format!("Review file must be a plain file name: {}", name));
            }
        }

        match self.assignments {
            Some(ref dir) if !dir.is_dir() => Err(format!(
                "Assignments directory does not exist: {}",
                dir.display()
            )),
            Some(_) => Ok(()),
            None => Err("Missing assignments directory".to_string()),
        }
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_args(assignments: PathBuf) -> Args {
        Args {
            assignments: Some(assignments),
            blacklist: None,
            review_file: None,
            output: None,
            format: None,
            bins: None,
            config: None,
            verbose: false,
            quiet: false,
            dry_run: false,
            no_statistics: false,
            init_config: false,
        }
    }

    #[test]
    fn test_validation_accepts_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(make_args(temp_dir.path().to_path_buf()).validate().is_ok());
    }

    #[test]
    fn test_validation_missing_directory() {
        let temp_dir = TempDir::new().unwrap();
        let args = make_args(temp_dir.path().join("blatt99"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = make_args(temp_dir.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_review_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = make_args(temp_dir.path().to_path_buf());
        args.review_file = Some("../korrektur.txt".to_string());
        assert!(args.validate().is_err());

        args.review_file = Some("review.txt".to_string());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_bins() {
        let temp_dir = TempDir::new().unwrap();
        let mut args = make_args(temp_dir.path().to_path_buf());
        args.bins = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_parse_positional_directory() {
        let args = Args::try_parse_from(["korrektor", "blatt03", "--format", "json"]).unwrap();
        assert_eq!(args.assignments, Some(PathBuf::from("blatt03")));
        assert_eq!(args.format, Some(OutputFormat::Json));
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args(PathBuf::from("."));
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
