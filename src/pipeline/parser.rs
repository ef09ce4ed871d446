//! Access-log line parser.
//!
//! One whitespace-delimited record per line with a fixed positional schema:
//! token 7 (0-based) is the request URL, the last token is the request
//! processing time in seconds. Everything else on the line is ignored.

use thiserror::Error;

/// Zero-based index of the request URL token.
const URL_FIELD: usize = 7;

/// Minimum token count: the URL token plus a separate trailing time token.
const MIN_FIELDS: usize = URL_FIELD + 2;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: expected at least {MIN_FIELDS} fields, found {found}")]
    TooFewFields { line: u64, found: usize },
    #[error("line {line}: invalid request time {value:?}")]
    InvalidTime { line: u64, value: String },
}

/// One parsed request observation. Transient: folded into the aggregates
/// and dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub url: String,
    /// Request processing time in seconds, finite and non-negative.
    pub request_time: f64,
}

/// Parse one raw log line. `line_no` is 1-based, used only for error context.
pub fn parse_line(raw: &str, line_no: u64) -> Result<LogRecord, ParseError> {
    let fields: Vec<&str> = raw.split_whitespace().collect();
    if fields.len() < MIN_FIELDS {
        return Err(ParseError::TooFewFields {
            line: line_no,
            found: fields.len(),
        });
    }

    let time_field = fields[fields.len() - 1];
    let request_time = time_field
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite() && *t >= 0.0)
        .ok_or_else(|| ParseError::InvalidTime {
            line: line_no,
            value: time_field.to_string(),
        })?;

    Ok(LogRecord {
        url: fields[URL_FIELD].to_string(),
        request_time,
    })
}
