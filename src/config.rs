//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.korrektor.toml` files.

use crate::analysis::DEFAULT_BINS;
use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = ".korrektor.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Exclusion list, relative to the working directory.
    #[serde(default = "default_blacklist")]
    pub blacklist: PathBuf,

    /// Review file name inside each student directory.
    #[serde(default = "default_review_file")]
    pub review_file: String,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            blacklist: default_blacklist(),
            review_file: default_review_file(),
            verbose: false,
        }
    }
}

fn default_blacklist() -> PathBuf {
    PathBuf::from("BLACKLIST")
}

fn default_review_file() -> String {
    "korrektur.txt".to_string()
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Report file name; relative paths are resolved against the
    /// assignments directory.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Histogram bins per exercise.
    #[serde(default = "default_bins")]
    pub histogram_bins: usize,

    /// Generate the report at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            histogram_bins: default_bins(),
            enabled: true,
        }
    }
}

fn default_output() -> PathBuf {
    PathBuf::from("statistics.pdf")
}

fn default_bins() -> usize {
    DEFAULT_BINS
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        let default_path = Path::new(CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref blacklist) = args.blacklist {
            self.general.blacklist = blacklist.clone();
        }
        if let Some(ref review_file) = args.review_file {
            self.general.review_file = review_file.clone();
        }
        if let Some(format) = args.format {
            self.report.format = format;
        }
        if let Some(bins) = args.bins {
            self.report.histogram_bins = bins;
        }

        // Flags always override
        if args.verbose {
            self.general.verbose = true;
        }
        if args.no_statistics {
            self.report.enabled = false;
        }
    }

    /// Where the report is written for a given assignments directory.
    ///
    /// `--output` is taken relative to the working directory; the config
    /// value relative to the assignments directory.
    pub fn report_path(&self, assignments_dir: &Path, cli_output: Option<&Path>) -> PathBuf {
        match cli_output {
            Some(path) => path.to_path_buf(),
            None => assignments_dir.join(&self.report.output),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
