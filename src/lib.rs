//! TCP round-trip-time analysis and plotting
//!
//! Loads RTT samples exported from packet captures and optional iperf3
//! throughput reports, computes summary statistics, and renders dual-axis
//! time-series charts with bandwidth-transition markers.

pub mod cli;
pub mod error;
pub mod markers;
pub mod output;
pub mod plot;
pub mod rtt;
pub mod stats;
pub mod throughput;
pub mod viewer;

pub use error::{AnalysisError, Result};
pub use markers::{Marker, MarkerPreset};
pub use plot::{overlay_chart, single_series_chart, Chart, OverlaySeries};
pub use rtt::{load_rtt, parse_rtt, RttSample, RttSeries};
pub use stats::{Summary, ThroughputStats};
pub use throughput::{load_throughput, parse_throughput, ThroughputPoint, ThroughputSeries};
