//! Input log discovery.
//!
//! Scans the configured log directory (non-recursive) for files named
//! `nginx-access-ui.log-YYYYMMDD`, plain or `.gz`, and selects the one with
//! the newest embedded date. Names that don't match the convention are
//! ignored, not errors.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use walkdir::WalkDir;

/// Filename prefix every input log carries.
const LOG_PREFIX: &str = "nginx-access-ui.log-";

/// How the log bytes are encoded on disk, implied by the extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Plain,
    Gzip,
}

/// A discovered input log. Immutable once selected.
#[derive(Debug, Clone)]
pub struct LogFile {
    pub path: PathBuf,
    pub date: NaiveDate,
    pub encoding: Encoding,
}

impl LogFile {
    /// Report filename derived from the log's embedded date.
    pub fn report_name(&self) -> String {
        format!("report-{}.html", self.date.format("%Y.%m.%d"))
    }
}

/// Match a directory entry name against the log naming convention.
///
/// Returns `None` for anything that is not `<prefix><8 digits>` or
/// `<prefix><8 digits>.gz`, including stamps that aren't real calendar
/// dates (the stamp is reused to name the report, so `99999999` is junk).
fn match_log_name(name: &str) -> Option<(NaiveDate, Encoding)> {
    let rest = name.strip_prefix(LOG_PREFIX)?;
    let (stamp, encoding) = match rest.strip_suffix(".gz") {
        Some(stamp) => (stamp, Encoding::Gzip),
        None => (rest, Encoding::Plain),
    };
    if stamp.len() != 8 || !stamp.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let date = NaiveDate::parse_from_str(stamp, "%Y%m%d").ok()?;
    Some((date, encoding))
}

/// Find the newest log in `log_dir`.
///
/// `Ok(None)` means no file matched the naming convention. An unreadable
/// directory is an error; the caller decides whether that is fatal. Two
/// files with the same date keep the first one encountered (the comparison
/// is strictly-greater).
pub fn find_latest_log(log_dir: &Path) -> Result<Option<LogFile>, walkdir::Error> {
    let mut latest: Option<LogFile> = None;

    for entry in WalkDir::new(log_dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        let Some((date, encoding)) = match_log_name(name) else {
            continue;
        };

        if latest.as_ref().map_or(true, |cur| date > cur.date) {
            latest = Some(LogFile {
                path: entry.into_path(),
                date,
                encoding,
            });
        }
    }

    if let Some(ref log) = latest {
        tracing::info!("Selected log {} (date {})", log.path.display(), log.date);
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"").unwrap();
    }

    #[test]
    fn test_match_log_name() {
        assert_eq!(
            match_log_name("nginx-access-ui.log-20170630.gz"),
            Some((NaiveDate::from_ymd_opt(2017, 6, 30).unwrap(), Encoding::Gzip))
        );
        assert_eq!(
            match_log_name("nginx-access-ui.log-20170630"),
            Some((NaiveDate::from_ymd_opt(2017, 6, 30).unwrap(), Encoding::Plain))
        );
    }

    #[test]
    fn test_match_log_name_rejects_junk() {
        // wrong prefix
        assert_eq!(match_log_name("nginx-access.log-20170630.gz"), None);
        // non-numeric stamp
        assert_eq!(match_log_name("nginx-access-ui.log-2017063a.gz"), None);
        // wrong stamp length
        assert_eq!(match_log_name("nginx-access-ui.log-201706.gz"), None);
        // numeric but not a calendar date
        assert_eq!(match_log_name("nginx-access-ui.log-99999999.gz"), None);
        // other compression suffix
        assert_eq!(match_log_name("nginx-access-ui.log-20170630.bz2"), None);
    }

    #[test]
    fn test_selects_newest_date() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-20170628");
        touch(dir.path(), "nginx-access-ui.log-20170630.gz");
        touch(dir.path(), "nginx-access-ui.log-20170629.gz");

        let log = find_latest_log(dir.path()).unwrap().unwrap();
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2017, 6, 30).unwrap());
        assert_eq!(log.encoding, Encoding::Gzip);
        assert!(log.path.ends_with("nginx-access-ui.log-20170630.gz"));
    }

    #[test]
    fn test_ignores_non_matching_names() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "nginx-access-ui.log-2017063x.gz");
        touch(dir.path(), "access.log");
        touch(dir.path(), "report-2017.06.30.html");

        assert!(find_latest_log(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_empty_dir_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(find_latest_log(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_missing_dir_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(find_latest_log(&missing).is_err());
    }

    #[test]
    fn test_report_name() {
        let log = LogFile {
            path: PathBuf::from("log/nginx-access-ui.log-20170630.gz"),
            date: NaiveDate::from_ymd_opt(2017, 6, 30).unwrap(),
            encoding: Encoding::Gzip,
        };
        assert_eq!(log.report_name(), "report-2017.06.30.html");
    }
}
