//! Analyse a tshark RTT export against an iperf3 run
//!
//! Usage: `rtt-analyse <rtt_csv_file> [iperf3_json_file]`

use anyhow::{bail, Context, Result};
use clap::Parser;
use rttplot::cli::{init_tracing, ChartOptions};
use rttplot::output::{analysis_path, file_stem};
use rttplot::{load_rtt, load_throughput, single_series_chart, MarkerPreset, ThroughputSeries, ThroughputStats};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Analyse TCP RTT from a tshark export alongside iperf3 throughput", long_about = None)]
struct Args {
    /// tshark export with frame.time_relative, tcp.seq, tcp.analysis.ack_rtt
    rtt_file: PathBuf,

    /// iperf3 JSON report
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

    if !args.rtt_file.exists() {
        bail!("RTT CSV file '{}' not found.", args.rtt_file.display());
    }

    let rtt = load_rtt(&args.rtt_file)
        .context("Error processing RTT CSV file")?
        .ensure_not_empty()?;
    let throughput = load_throughput(args.throughput_json.as_deref()).map(ThroughputSeries::with_zero_anchor);
    let markers = args.chart.markers(MarkerPreset::Stepdown)?;

    println!("Analyzed {} RTT data points", rtt.len());
    if let Some(tp) = &throughput {
        println!("Analyzed {} iperf3 intervals", tp.len());
    }

    let mut title = format!("TCP RTT Analysis - {}", file_stem(&args.rtt_file));
    if throughput.is_some() {
        title.push_str(" with iperf3 Throughput");
    }

    // A single point gives no line to draw
    let plotted = throughput.as_ref().filter(|t| t.len() > 1);

    let out = analysis_path(&args.outdir, &args.rtt_file);
    single_series_chart(title, &rtt, plotted, &markers, ThroughputStats::Detailed).render(&out)?;
    args.chart.finish(&out);

    Ok(())
}
