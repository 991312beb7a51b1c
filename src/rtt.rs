//! RTT sample loading and normalization
//!
//! Reads delimited exports of TCP round-trip times, as produced by
//! `tshark -T fields -E header=y -E separator=, -e frame.time_relative -e tcp.seq -e tcp.analysis.ack_rtt`
//! or by hand as plain `time,rtt` pairs, and maps them onto [`RttSample`]s.
//! Rows whose time or RTT does not parse to a finite number are dropped.

use crate::error::{AnalysisError, Result};
use crate::output::file_stem;
use crate::stats::Summary;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const TIME_COLUMN: &str = "frame.time_relative";
pub const SEQ_COLUMN: &str = "tcp.seq";
pub const RTT_COLUMN: &str = "tcp.analysis.ack_rtt";

const SHORT_TIME_COLUMNS: [&str; 2] = ["time", "Time"];
const SHORT_RTT_COLUMNS: [&str; 2] = ["rtt", "RTT"];
const SHORT_SEQ_COLUMNS: [&str; 2] = ["seq", SEQ_COLUMN];

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RttSample {
    /// Seconds since capture start
    pub time_s: f64,
    pub rtt_ms: f64,
    pub seq: Option<u64>,
}

/// Ordered RTT samples from one capture.
#[derive(Clone, Debug, Default)]
pub struct RttSeries {
    pub label: String,
    pub source: PathBuf,
    pub samples: Vec<RttSample>,
}

impl RttSeries {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().map(|s| (s.time_s, s.rtt_ms))
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::of(self.samples.iter().map(|s| s.rtt_ms))
    }

    /// Fails with [`AnalysisError::NoSamples`] when nothing survived cleaning.
    pub fn ensure_not_empty(self) -> Result<Self> {
        if self.is_empty() {
            return Err(AnalysisError::NoSamples(self.source));
        }
        Ok(self)
    }
}

/// Where the interesting fields live in each record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ColumnLayout {
    time: usize,
    rtt: usize,
    seq: Option<usize>,
    /// First record is a header row rather than data
    header: bool,
}

impl ColumnLayout {
    fn positional(columns: usize, header: bool) -> Option<Self> {
        match columns {
            2 => Some(Self { time: 0, rtt: 1, seq: None, header }),
            3 => Some(Self { time: 0, rtt: 2, seq: Some(1), header }),
            _ => None,
        }
    }
}

fn find_column(names: &[&str], candidates: &[&str]) -> Option<usize> {
    names.iter().position(|n| candidates.contains(n))
}

fn resolve_layout(first: &StringRecord) -> Option<ColumnLayout> {
    let names: Vec<&str> = first.iter().collect();

    let time = find_column(&names, &[TIME_COLUMN]);
    let rtt = find_column(&names, &[RTT_COLUMN]);
    if let (Some(time), Some(rtt)) = (time, rtt) {
        return Some(ColumnLayout {
            time,
            rtt,
            seq: find_column(&names, &[SEQ_COLUMN]),
            header: true,
        });
    }
    if time.is_some() || rtt.is_some() {
        warn!("CSV file missing expected columns. Found: {:?}", names);
    }

    if let (Some(time), Some(rtt)) = (
        find_column(&names, &SHORT_TIME_COLUMNS),
        find_column(&names, &SHORT_RTT_COLUMNS),
    ) {
        return Some(ColumnLayout {
            time,
            rtt,
            seq: find_column(&names, &SHORT_SEQ_COLUMNS),
            header: true,
        });
    }

    // Only time and rtt decide whether the first row is data; seq may be blank
    let layout = ColumnLayout::positional(names.len(), true).map(|mut l| {
        l.header = parse_float(names[l.time]).is_none() || parse_float(names[l.rtt]).is_none();
        l
    });
    match layout {
        Some(l) if l.header => debug!("Unrecognized header {:?}, using positional columns", names),
        Some(_) => debug!("Headerless input with {} columns", names.len()),
        None => warn!(
            "Unexpected RTT columns, expected 2 or 3 but found {}: {:?}",
            names.len(),
            names
        ),
    }
    layout
}

fn parse_float(field: &str) -> Option<f64> {
    field.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_row(record: &StringRecord, layout: &ColumnLayout) -> Option<RttSample> {
    let time_s = parse_float(record.get(layout.time)?)?;
    let rtt_ms = parse_float(record.get(layout.rtt)?)?;
    let seq = layout
        .seq
        .and_then(|i| record.get(i))
        .and_then(|f| f.trim().parse::<u64>().ok());
    Some(RttSample { time_s, rtt_ms, seq })
}

/// Parse RTT samples from any reader. `source` is used for the label and
/// error reporting only.
pub fn parse_rtt<R: Read>(reader: R, source: &Path) -> Result<RttSeries> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut series = RttSeries {
        label: file_stem(source),
        source: source.to_path_buf(),
        samples: Vec::new(),
    };

    let mut records = rdr.records();
    let first = match records.next() {
        Some(r) => r?,
        None => {
            warn!("RTT file {} is empty", source.display());
            return Ok(series);
        }
    };

    let layout = match resolve_layout(&first) {
        Some(l) => l,
        None => return Ok(series),
    };

    let mut total = 0usize;
    if !layout.header {
        total += 1;
        series.samples.extend(parse_row(&first, &layout));
    }
    for record in records {
        let record = record?;
        total += 1;
        series.samples.extend(parse_row(&record, &layout));
    }

    let dropped = total - series.samples.len();
    if dropped > 0 {
        debug!("Dropped {} of {} rows with non-numeric time or RTT", dropped, total);
    }
    Ok(series)
}

/// Load an RTT export from disk.
pub fn load_rtt(path: &Path) -> Result<RttSeries> {
    let file = File::open(path).map_err(|e| AnalysisError::io(path, e))?;
    let series = parse_rtt(file, path)?;
    debug!("Loaded {} RTT samples from {}", series.len(), path.display());
    Ok(series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> RttSeries {
        parse_rtt(input.as_bytes(), Path::new("capture.csv")).unwrap()
    }

    fn rtts(series: &RttSeries) -> Vec<f64> {
        series.samples.iter().map(|s| s.rtt_ms).collect()
    }

    #[test]
    fn test_short_header() {
        let s = parse("time,rtt\n0,10\n1,20\n");
        assert_eq!(s.len(), 2);
        assert_eq!(s.label, "capture");
        assert_eq!(s.samples[1], RttSample { time_s: 1.0, rtt_ms: 20.0, seq: None });

        let summary = s.summary().unwrap();
        assert_eq!(summary.mean, 15.0);
        assert_eq!(summary.min, 10.0);
        assert_eq!(summary.max, 20.0);
    }

    #[test]
    fn test_tshark_header_any_order() {
        let s = parse("tcp.seq,tcp.analysis.ack_rtt,frame.time_relative\n1,0.02,0.5\n1449,,0.6\n2897,0.03,0.7\n");
        assert_eq!(s.len(), 2);
        assert_eq!(s.samples[0].time_s, 0.5);
        assert_eq!(s.samples[0].seq, Some(1));
        assert_eq!(rtts(&s), vec![0.02, 0.03]);
    }

    #[test]
    fn test_headerless_two_and_three_columns() {
        let two = parse("0.0,12.5\n0.1,13.5\n");
        assert_eq!(rtts(&two), vec![12.5, 13.5]);

        let three = parse("0.0,1,12.5\n0.1,1449,13.5\n0.2,2897,14.5\n");
        assert_eq!(three.len(), 3);
        assert_eq!(rtts(&three), vec![12.5, 13.5, 14.5]);
        assert_eq!(three.samples[2].seq, Some(2897));
    }

    #[test]
    fn test_headerless_blank_seq_keeps_first_row() {
        let s = parse("0.0,,12.5\n0.1,,13.5\n0.2,,14.5\n");
        assert_eq!(s.len(), 3);
        assert_eq!(s.samples[0], RttSample { time_s: 0.0, rtt_ms: 12.5, seq: None });
    }

    #[test]
    fn test_partial_tshark_header_falls_back_to_positional() {
        let first = StringRecord::from(vec![TIME_COLUMN, "foo"]);
        assert_eq!(
            resolve_layout(&first),
            Some(ColumnLayout { time: 0, rtt: 1, seq: None, header: true })
        );

        let first = StringRecord::from(vec![TIME_COLUMN, SEQ_COLUMN, "ack"]);
        assert_eq!(
            resolve_layout(&first),
            Some(ColumnLayout { time: 0, rtt: 2, seq: Some(1), header: true })
        );

        let s = parse("frame.time_relative,foo\n0.5,20\n0.6,x\n");
        assert_eq!(s.len(), 1);
        assert_eq!(s.samples[0].rtt_ms, 20.0);

        // Too many columns to fall back on
        assert!(resolve_layout(&StringRecord::from(vec![RTT_COLUMN, "a", "b", "c"])).is_none());
    }

    #[test]
    fn test_unrecognized_header_is_positional() {
        let s = parse("when,seqno,delay\n1,2,3\n");
        assert_eq!(s.len(), 1);
        assert_eq!(s.samples[0].time_s, 1.0);
        assert_eq!(s.samples[0].rtt_ms, 3.0);
    }

    #[test]
    fn test_invalid_rows_dropped() {
        let s = parse("time,rtt\n0,10\nabc,11\n2,\n3,nan\n4,inf\n5\n6, 16 \n");
        assert_eq!(s.samples.iter().map(|s| s.time_s).collect::<Vec<_>>(), vec![0.0, 6.0]);
        assert_eq!(rtts(&s), vec![10.0, 16.0]);
    }

    #[test]
    fn test_all_valid_rows_kept() {
        let mut input = String::from("frame.time_relative,tcp.seq,tcp.analysis.ack_rtt\n");
        for i in 0..250 {
            input.push_str(&format!("{},{},{}\n", i as f64 * 0.01, i * 1448, 20.0 + (i % 7) as f64));
        }
        assert_eq!(parse(&input).len(), 250);
    }

    #[test]
    fn test_unexpected_shape_yields_empty() {
        let s = parse("a,b,c,d\n1,2,3,4\n");
        assert!(s.is_empty());
        assert!(matches!(s.ensure_not_empty(), Err(AnalysisError::NoSamples(_))));

        assert!(parse("").is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_rtt(Path::new("/nonexistent/rtt.csv")).unwrap_err();
        assert!(matches!(err, AnalysisError::Io { .. }));
    }
}
