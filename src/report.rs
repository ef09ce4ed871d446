//! Report rendering.
//!
//! Sorts finalized rows by average time descending, caps them to the
//! configured report size, serializes them to a JSON array and substitutes
//! it into the HTML template's `$table_json` placeholder. The report is
//! written to a temp file and renamed into place so a failed run never
//! leaves a partial report behind (a partial report would fool the
//! idempotence check on the next run).

use std::cmp::Ordering;
use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::stats::UrlReport;

/// Placeholder in the HTML template replaced by the JSON row array.
const TABLE_PLACEHOLDER: &str = "$table_json";

/// Template filename expected inside the report directory.
pub const TEMPLATE_NAME: &str = "report.html";

/// Sort rows by `time_avg` descending and cap to `report_size`.
///
/// The sort is stable, so ties keep first-seen order.
pub fn top_rows(mut rows: Vec<UrlReport>, report_size: usize) -> Vec<UrlReport> {
    rows.sort_by(|a, b| {
        b.time_avg
            .partial_cmp(&a.time_avg)
            .unwrap_or(Ordering::Equal)
    });
    rows.truncate(report_size);
    rows
}

/// Render `rows` into the template and write the report at `report_path`.
///
/// A missing or unreadable template is fatal; so is an unwritable
/// destination. Both errors name the attempted path.
pub fn write_report(rows: &[UrlReport], template_path: &Path, report_path: &Path) -> Result<()> {
    let template = std::fs::read_to_string(template_path)
        .with_context(|| format!("reading report template {}", template_path.display()))?;

    let table_json = serde_json::to_string(rows).context("serializing report rows")?;
    let rendered = template.replace(TABLE_PLACEHOLDER, &table_json);

    let tmp_path = report_path.with_extension("html.tmp");
    std::fs::write(&tmp_path, rendered.as_bytes())
        .with_context(|| format!("writing report to {}", tmp_path.display()))?;
    std::fs::rename(&tmp_path, report_path)
        .with_context(|| format!("moving report into place at {}", report_path.display()))?;

    tracing::info!("Report written to {}", report_path.display());
    Ok(())
}
