//! Run controller.
//!
//! Orchestrates one analyzer run: discovery → idempotence guard → single
//! streaming pass (read, parse, aggregate) → finalization → rendering.
//! A run either ends as a benign no-op (no log, or the log's report already
//! exists) or produces exactly one report file. There are no retries: any
//! failure mid-stream aborts the run before a report is written.

use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::config::Config;
use crate::discovery;
use crate::pipeline::parser;
use crate::pipeline::reader::LogLines;
use crate::pipeline::stats::Aggregator;
use crate::report;

/// Terminal state of one analyzer run.
#[derive(Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// No log matching the naming convention was found.
    NoLog,
    /// The located log already has a report; nothing was parsed.
    AlreadyReported(PathBuf),
    /// A fresh report was written.
    Reported(PathBuf),
}

/// Execute one analyzer run against `config`.
pub fn run(config: &Config) -> Result<RunOutcome> {
    // 1. Locate the newest log. No match — or an unreadable log directory —
    // means there is nothing to do, not a failure.
    let log = match discovery::find_latest_log(&config.log_dir) {
        Ok(Some(log)) => log,
        Ok(None) => {
            tracing::info!("No matching log found in {}", config.log_dir.display());
            return Ok(RunOutcome::NoLog);
        }
        Err(e) => {
            tracing::warn!(
                "Cannot read log directory {}: {}",
                config.log_dir.display(),
                e
            );
            return Ok(RunOutcome::NoLog);
        }
    };

    // 2. Idempotence guard, checked before any parsing work.
    let report_path = config.report_dir.join(log.report_name());
    if report_path.exists() {
        tracing::info!(
            "Report {} already exists — skipping {}",
            report_path.display(),
            log.path.display()
        );
        return Ok(RunOutcome::AlreadyReported(report_path));
    }

    // 3. Single streaming pass. The first malformed line aborts the whole
    // run, so a report is only ever rendered from a fully consumed log.
    let lines =
        LogLines::open(&log).with_context(|| format!("opening log {}", log.path.display()))?;
    let mut aggregator = Aggregator::new();
    for (i, line) in lines.enumerate() {
        let line = line.with_context(|| format!("reading log {}", log.path.display()))?;
        let record = parser::parse_line(&line, i as u64 + 1)
            .with_context(|| format!("parsing log {}", log.path.display()))?;
        aggregator.add(record);
    }
    tracing::info!(
        "Aggregated {} requests ({:.3}s total) across {} URLs",
        aggregator.total_count(),
        aggregator.total_time(),
        aggregator.url_count()
    );

    // 4. Finalize and render.
    let rows = aggregator
        .finalize()
        .with_context(|| format!("finalizing stats for {}", log.path.display()))?;
    tracing::info!("Finalized stats for {} URLs", rows.len());
    let top = report::top_rows(rows, config.report_size);
    let template_path = config.report_dir.join(report::TEMPLATE_NAME);
    report::write_report(&top, &template_path, &report_path)?;

    Ok(RunOutcome::Reported(report_path))
}
