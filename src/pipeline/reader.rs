//! Streaming line reader for plain or gzip-compressed logs.
//!
//! Forward-only and single-pass: lines are decoded incrementally, never
//! materialized as a whole, and the iterator cannot be rewound — consuming
//! the log twice means reopening it. Decode failures carry the 1-based line
//! number where the stream broke.

use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};

use flate2::bufread::GzDecoder;
use thiserror::Error;

use crate::discovery::{Encoding, LogFile};

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// I/O or byte-decode failure (e.g. invalid UTF-8, truncated gzip
    /// stream) at the given 1-based line.
    #[error("decode error at line {line}: {source}")]
    Line {
        line: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Lazy iterator over the decoded, newline-stripped lines of a log file.
pub struct LogLines {
    lines: Lines<BufReader<Box<dyn Read>>>,
    line_no: u64,
}

impl LogLines {
    /// Open `log` for a single streaming pass, decompressing if needed.
    pub fn open(log: &LogFile) -> Result<Self, ReadError> {
        let file = File::open(&log.path).map_err(|source| ReadError::Open {
            path: log.path.display().to_string(),
            source,
        })?;

        let source: Box<dyn Read> = match log.encoding {
            Encoding::Gzip => Box::new(GzDecoder::new(BufReader::new(file))),
            Encoding::Plain => Box::new(file),
        };

        Ok(Self {
            lines: BufReader::new(source).lines(),
            line_no: 0,
        })
    }
}

impl Iterator for LogLines {
    type Item = Result<String, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        let result = self.lines.next()?;
        self.line_no += 1;
        let line = self.line_no;
        Some(result.map_err(|source| ReadError::Line { line, source }))
    }
}
