//! Analyzer configuration.
//!
//! Built-in defaults, merged with an optional JSON override file, then CLI
//! flag overrides. The resulting value is passed into the pipeline — there
//! is no process-wide mutable config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Analyzer configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of rows in the rendered report.
    pub report_size: usize,
    /// Directory holding the `report.html` template and receiving reports.
    pub report_dir: PathBuf,
    /// Directory scanned for input logs.
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            report_size: 1000,
            report_dir: PathBuf::from("./reports"),
            log_dir: PathBuf::from("./log"),
        }
    }
}

/// On-disk override file. Every key is optional; unknown keys are rejected
/// so a typo fails loudly at startup instead of being silently ignored.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(rename = "REPORT_SIZE")]
    report_size: Option<usize>,
    #[serde(rename = "REPORT_DIR")]
    report_dir: Option<PathBuf>,
    #[serde(rename = "LOG_DIR")]
    log_dir: Option<PathBuf>,
}

impl Config {
    /// Built-in defaults merged with the optional JSON override file.
    ///
    /// No `path` means defaults only. An unreadable or malformed file is a
    /// fatal startup error — the pipeline never runs on a half-read config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = Self::default();
        let Some(path) = path else {
            return Ok(config);
        };

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let overrides: ConfigFile = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;

        if let Some(size) = overrides.report_size {
            config.report_size = size;
        }
        if let Some(dir) = overrides.report_dir {
            config.report_dir = dir;
        }
        if let Some(dir) = overrides.log_dir {
            config.log_dir = dir;
        }
        Ok(config)
    }

    /// Override individual fields from CLI args.
    pub fn with_overrides(
        mut self,
        log_dir: Option<&Path>,
        report_dir: Option<&Path>,
        report_size: Option<usize>,
    ) -> Self {
        if let Some(dir) = log_dir {
            self.log_dir = dir.to_path_buf();
        }
        if let Some(dir) = report_dir {
            self.report_dir = dir.to_path_buf();
        }
        if let Some(size) = report_size {
            self.report_size = size;
        }
        self
    }
}
