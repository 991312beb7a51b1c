//! Plot one RTT capture as a line plot
//!
//! Usage: `rtt-plot <rtt_csv_file> [iperf3_json_file]`

use anyhow::{bail, Context, Result};
use clap::Parser;
use rttplot::cli::{init_tracing, ChartOptions};
use rttplot::output::{file_stem, lineplot_path};
use rttplot::{load_rtt, load_throughput, single_series_chart, MarkerPreset, ThroughputStats};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plot TCP RTT samples with an optional iperf3 throughput overlay", long_about = None)]
struct Args {
    /// RTT samples (CSV with time,rtt columns or a tshark field export)
    rtt_file: PathBuf,

    /// iperf3 JSON report to overlay as throughput
    throughput_json: Option<PathBuf>,

    /// Directory for the output image
    #[arg(long, default_value = ".")]
    outdir: PathBuf,

    #[command(flatten)]
    chart: ChartOptions,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.chart.verbose);

    if !args.rtt_file.is_file() {
        bail!("RTT file {} not found", args.rtt_file.display());
    }

    let rtt = load_rtt(&args.rtt_file)
        .context("Error reading RTT data")?
        .ensure_not_empty()?;
    let throughput = load_throughput(args.throughput_json.as_deref());
    let markers = args.chart.markers(MarkerPreset::Shaping)?;

    info!(
        "Loaded {} RTT samples{}",
        rtt.len(),
        throughput
            .as_ref()
            .map(|t| format!(" and {} throughput intervals", t.len()))
            .unwrap_or_default()
    );

    let requested = args.throughput_json.is_some();
    let mut title = format!("TCP Analysis - {}", file_stem(&args.rtt_file));
    if requested {
        title.push_str(" with iperf3 throughput");
    }

    let out = lineplot_path(&args.outdir, &args.rtt_file, requested);
    single_series_chart(title, &rtt, throughput.as_ref(), &markers, ThroughputStats::Brief).render(&out)?;
    args.chart.finish(&out);

    Ok(())
}
