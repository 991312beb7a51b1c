//! Overlay up to three RTT captures on one chart
//!
//! Usage: `rtt-compare a.csv b.csv [-i a.json b.json] [-l cubic bbr] [-o out.png]`

use anyhow::{bail, Result};
use clap::Parser;
use rttplot::cli::{init_tracing, ChartOptions};
use rttplot::output::{file_stem, DEFAULT_COMPARISON_FILE};
use rttplot::plot::MAX_OVERLAY_SERIES;
use rttplot::{load_rtt, load_throughput, overlay_chart, MarkerPreset, OverlaySeries};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(author, version, about = "Compare multiple RTT CSV files with optional iperf3 data", long_about = None)]
struct Args {
    /// 1-3 RTT CSV files to compare
    #[arg(required = true, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Corresponding iperf3 JSON files
    #[arg(short, long, num_args = 0..)]
    iperf: Vec<PathBuf>,

    /// Labels for each dataset
    #[arg(short, long, num_args = 0..)]
    labels: Vec<String>,

    /// Output file name (PNG, or SVG by extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    chart: ChartOptions,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.chart.verbose);

    if args.files.len() > MAX_OVERLAY_SERIES {
        bail!("Maximum {} RTT files can be compared at once.", MAX_OVERLAY_SERIES);
    }

    // Labels only apply when there is one per file
    let labels: Vec<String> = if args.labels.len() == args.files.len() {
        args.labels.clone()
    } else {
        args.files.iter().map(|f| file_stem(f)).collect()
    };

    let mut series = Vec::with_capacity(args.files.len());
    for (i, file) in args.files.iter().enumerate() {
        if !file.exists() {
            warn!("File {} not found. Skipping.", file.display());
            continue;
        }

        let rtt = match load_rtt(file) {
            Ok(rtt) if !rtt.is_empty() => rtt.with_label(labels[i].clone()),
            Ok(_) => {
                warn!("No valid RTT samples in {}. Skipping.", file.display());
                continue;
            }
            Err(e) => {
                warn!("Error processing RTT CSV file {}: {}", file.display(), e);
                continue;
            }
        };
        let throughput = load_throughput(args.iperf.get(i).map(PathBuf::as_path));

        info!("{}: {} RTT samples", rtt.label, rtt.len());
        series.push(OverlaySeries::new(i, rtt, throughput));
    }

    if series.is_empty() {
        bail!("No valid RTT data to plot");
    }

    let markers = args.chart.markers(MarkerPreset::Compact)?;
    let out = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_COMPARISON_FILE));

    overlay_chart(&series, &markers)?.render(&out)?;
    args.chart.finish(&out);

    Ok(())
}
