//! iperf3 throughput interval loading
//!
//! Only the per-interval `sum` record of an `iperf3 --json` report is used.
//! Any malformed interval abandons the whole file; the caller then plots RTT
//! alone.

use crate::error::{AnalysisError, Result};
use crate::stats::Summary;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, warn};

const BITS_PER_MEGABIT: f64 = 1_000_000.0;

#[derive(Debug, Deserialize)]
struct IperfReport {
    #[serde(default)]
    intervals: Vec<IperfInterval>,
}

#[derive(Debug, Deserialize)]
struct IperfInterval {
    sum: IntervalSum,
}

#[derive(Debug, Deserialize)]
struct IntervalSum {
    end: f64,
    bits_per_second: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThroughputPoint {
    /// Interval end, seconds since test start
    pub end_s: f64,
    pub mbps: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ThroughputSeries {
    pub points: Vec<ThroughputPoint>,
}

impl ThroughputSeries {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.points.iter().map(|p| (p.end_s, p.mbps))
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::of(self.points.iter().map(|p| p.mbps))
    }

    pub fn max_mbps(&self) -> Option<f64> {
        self.points.iter().map(|p| p.mbps).reduce(f64::max)
    }

    /// Prepends a `(0 s, 0 Mbps)` point when the first interval ends after zero.
    pub fn with_zero_anchor(mut self) -> Self {
        if matches!(self.points.first(), Some(p) if p.end_s > 0.0) {
            self.points.insert(0, ThroughputPoint { end_s: 0.0, mbps: 0.0 });
        }
        self
    }

    /// Transferred volume in megabits, approximated as mean rate times interval count.
    pub fn total_transfer_mbit(&self) -> Option<f64> {
        self.summary().map(|s| s.mean * self.points.len() as f64)
    }
}

/// Parse an iperf3 JSON report.
pub fn parse_throughput<R: Read>(reader: R) -> Result<ThroughputSeries> {
    let report: IperfReport = serde_json::from_reader(reader)?;
    let points = report
        .intervals
        .into_iter()
        .map(|i| ThroughputPoint {
            end_s: i.sum.end,
            mbps: i.sum.bits_per_second / BITS_PER_MEGABIT,
        })
        .collect();
    Ok(ThroughputSeries { points })
}

fn read_throughput(path: &Path) -> Result<ThroughputSeries> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    parse_throughput(BufReader::new(file))
}

/// Load optional throughput data. Every failure is advisory and yields `None`.
pub fn load_throughput(path: Option<&Path>) -> Option<ThroughputSeries> {
    let path = path?;

    if !path.exists() {
        warn!(
            "iperf3 JSON file '{}' not found. Continuing with RTT analysis only.",
            path.display()
        );
        return None;
    }

    match read_throughput(path) {
        Ok(series) => {
            debug!("Loaded {} throughput intervals from {}", series.len(), path.display());
            Some(series)
        }
        Err(e) => {
            warn!("Could not process iperf3 JSON file {}: {}", path.display(), e);
            None
        }
    }
}
