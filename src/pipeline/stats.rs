//! Per-URL timing aggregation and finalization.
//!
//! One streaming pass folds each record into a running accumulator; after
//! the pass, `finalize` derives percentages, averages and medians. The
//! median is positional — the arrival-order middle sample, not a sorted
//! median — which is why every individual sample is kept until finalization.
//! Memory is O(total requests), an inherited tradeoff of that median.

use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use super::parser::LogRecord;

/// Every ingested request took 0.000s, so time shares are undefined.
/// Finalizing such a pass aborts the run rather than emitting NaN rows.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("total request time is zero; time percentages are undefined")]
pub struct ZeroTotalTime;

/// Running per-URL accumulator. Created on first sight of a URL, mutated
/// for every subsequent occurrence during the pass.
#[derive(Debug)]
struct UrlAccumulator {
    url: String,
    count: u64,
    time_sum: f64,
    time_max: f64,
    /// Arrival-ordered samples, kept for the positional median.
    samples: Vec<f64>,
}

impl UrlAccumulator {
    fn new(url: String, time: f64) -> Self {
        Self {
            url,
            count: 1,
            time_sum: time,
            time_max: time,
            samples: vec![time],
        }
    }

    fn update_with(&mut self, time: f64) {
        self.count += 1;
        self.time_sum += time;
        if time > self.time_max {
            self.time_max = time;
        }
        self.samples.push(time);
    }
}

/// Finalized per-URL report row, serialized into the report verbatim.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UrlReport {
    pub url: String,
    pub count: u64,
    /// Share of the global request count, percent.
    pub count_perc: f64,
    pub time_avg: f64,
    pub time_max: f64,
    /// Arrival-order middle sample (see module docs).
    pub time_med: f64,
    /// Share of the global request time, percent.
    pub time_perc: f64,
    pub time_sum: f64,
}

/// Aggregation state for one log pass. Single writer, no readers until the
/// pass completes.
#[derive(Debug, Default)]
pub struct Aggregator {
    /// URL → index into `entries`. Entries stay in first-seen order so
    /// finalized rows (and report tie-breaking) are deterministic.
    index: HashMap<String, usize>,
    entries: Vec<UrlAccumulator>,
    total_count: u64,
    total_time: f64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one record into the running stats. O(1) amortized.
    pub fn add(&mut self, record: LogRecord) {
        let LogRecord { url, request_time } = record;
        match self.index.get(&url) {
            Some(&i) => self.entries[i].update_with(request_time),
            None => {
                self.index.insert(url.clone(), self.entries.len());
                self.entries.push(UrlAccumulator::new(url, request_time));
            }
        }
        self.total_count += 1;
        self.total_time += request_time;
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn url_count(&self) -> usize {
        self.entries.len()
    }

    /// Derive the final metrics for every URL, in first-seen order.
    ///
    /// Zero ingested records yield an empty row set; the percentage
    /// denominators are never touched in that case. A pass where every
    /// request time was zero is an error: `time_perc` has no defined
    /// value and a NaN would serialize as `null` in the report.
    pub fn finalize(self) -> Result<Vec<UrlReport>, ZeroTotalTime> {
        if self.total_count == 0 {
            return Ok(Vec::new());
        }
        if self.total_time == 0.0 {
            return Err(ZeroTotalTime);
        }
        let total_count = self.total_count as f64;
        let total_time = self.total_time;

        let rows = self
            .entries
            .into_iter()
            .map(|acc| {
                let time_med = acc.samples[acc.samples.len() / 2];
                UrlReport {
                    url: acc.url,
                    count: acc.count,
                    count_perc: round3(100.0 * acc.count as f64 / total_count),
                    time_avg: round3(acc.time_sum / acc.count as f64),
                    time_max: round3(acc.time_max),
                    time_med: round3(time_med),
                    time_perc: round3(100.0 * acc.time_sum / total_time),
                    time_sum: round3(acc.time_sum),
                }
            })
            .collect();
        Ok(rows)
    }
}

/// Round to 3 decimal digits, the precision of every float in the report.
fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn record(url: &str, time: f64) -> LogRecord {
        LogRecord {
            url: url.to_string(),
            request_time: time,
        }
    }

    #[test]
    fn test_three_line_aggregation() {
        let mut agg = Aggregator::new();
        agg.add(record("/a", 0.100));
        agg.add(record("/b", 0.200));
        agg.add(record("/a", 0.300));

        assert_eq!(agg.total_count(), 3);
        assert!((agg.total_time() - 0.600).abs() < 1e-9);
        assert_eq!(agg.url_count(), 2);

        let rows = agg.finalize().unwrap();
        assert_eq!(rows.len(), 2);

        let a = &rows[0];
        assert_eq!(a.url, "/a");
        assert_eq!(a.count, 2);
        assert_eq!(a.time_sum, 0.400);
        assert_eq!(a.time_avg, 0.200);
        assert_eq!(a.time_max, 0.300);
        assert_eq!(a.count_perc, 66.667);

        let b = &rows[1];
        assert_eq!(b.url, "/b");
        assert_eq!(b.count, 1);
        assert_eq!(b.time_sum, 0.200);
        assert_eq!(b.time_avg, 0.200);
        assert_eq!(b.time_max, 0.200);
        assert_eq!(b.count_perc, 33.333);
    }

    #[test]
    fn test_positional_median_not_sorted_median() {
        let mut agg = Aggregator::new();
        agg.add(record("/a", 1.0));
        agg.add(record("/a", 5.0));
        agg.add(record("/a", 2.0));

        let rows = agg.finalize().unwrap();
        // Middle-by-arrival-order sample: index 1 of [1.0, 5.0, 2.0].
        assert_eq!(rows[0].time_med, 5.0);
    }

    #[test]
    fn test_single_sample_median_is_the_sample() {
        let mut agg = Aggregator::new();
        agg.add(record("/a", 0.42));
        let rows = agg.finalize().unwrap();
        assert_eq!(rows[0].time_med, 0.42);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let mut agg = Aggregator::new();
        for i in 0..7 {
            agg.add(record(&format!("/u{}", i), 0.1 + i as f64 * 0.05));
        }
        agg.add(record("/u3", 1.5));
        agg.add(record("/u5", 0.01));

        let rows = agg.finalize().unwrap();
        let count_perc: f64 = rows.iter().map(|r| r.count_perc).sum();
        let time_perc: f64 = rows.iter().map(|r| r.time_perc).sum();
        assert!((count_perc - 100.0).abs() < 0.01, "count_perc sum {count_perc}");
        assert!((time_perc - 100.0).abs() < 0.01, "time_perc sum {time_perc}");
    }

    #[test]
    fn test_totals_match_row_sums() {
        let mut agg = Aggregator::new();
        let samples = [("/a", 0.1), ("/b", 0.25), ("/a", 0.3), ("/c", 0.125)];
        for (url, t) in samples {
            agg.add(record(url, t));
        }
        let total_count = agg.total_count();
        let total_time = agg.total_time();

        let rows = agg.finalize().unwrap();
        let count_sum: u64 = rows.iter().map(|r| r.count).sum();
        let time_sum: f64 = rows.iter().map(|r| r.time_sum).sum();
        assert_eq!(count_sum, total_count);
        assert!((time_sum - total_time).abs() < 0.001);
    }

    #[test]
    fn test_empty_input_finalizes_empty() {
        let agg = Aggregator::new();
        assert!(agg.finalize().unwrap().is_empty());
    }

    #[test]
    fn test_all_zero_times_refuse_to_finalize() {
        // Zero times are valid per-record, but a pass where the total is
        // zero has no defined time shares and must not produce rows.
        let mut agg = Aggregator::new();
        agg.add(record("/a", 0.0));
        agg.add(record("/a", 0.0));
        agg.add(record("/b", 0.0));

        assert_eq!(agg.finalize(), Err(ZeroTotalTime));
    }

    #[test]
    fn test_rows_keep_first_seen_order() {
        let mut agg = Aggregator::new();
        agg.add(record("/z", 0.1));
        agg.add(record("/a", 0.1));
        agg.add(record("/m", 0.1));
        agg.add(record("/a", 0.1));

        let rows = agg.finalize().unwrap();
        let urls: Vec<&str> = rows.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["/z", "/a", "/m"]);
    }

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.0 / 3.0 * 100.0), 33.333);
        assert_eq!(round3(0.1 + 0.2), 0.3);
        assert_eq!(round3(2.0), 2.0);
    }
}
