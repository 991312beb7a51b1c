//! End-to-end checks of the load -> summarize -> render pipeline through the library API

use rttplot::{
    load_rtt, load_throughput, overlay_chart, single_series_chart, MarkerPreset, OverlaySeries, ThroughputStats,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_two_row_summary_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("two.csv");
    fs::write(&path, "time,rtt\n0,10\n1,20").unwrap();

    let rtt = load_rtt(&path).unwrap();
    assert_eq!(rtt.len(), 2);
    let summary = rtt.summary().unwrap();
    assert!((summary.mean - 15.0).abs() < 1e-12);
    assert_eq!(summary.min, 10.0);
    assert_eq!(summary.max, 20.0);
}

#[test]
fn test_mbps_conversion_from_disk() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("iperf.json");
    fs::write(
        &path,
        r#"{"intervals": [
            {"sum": {"end": 1.0, "bits_per_second": 123456789.0}},
            {"sum": {"end": 2.0, "bits_per_second": 0.0}}
        ]}"#,
    )
    .unwrap();

    let tp = load_throughput(Some(&path)).unwrap();
    let mbps: Vec<f64> = tp.points.iter().map(|p| p.mbps).collect();
    assert!((mbps[0] - 123.456789).abs() < 1e-9);
    assert_eq!(mbps[1], 0.0);
}

#[test]
fn test_rtt_only_chart_when_throughput_missing() {
    let dir = TempDir::new().unwrap();
    let rtt_path = dir.path().join("r.csv");
    fs::write(&rtt_path, "0.0,12\n0.5,14\n1.0,13\n").unwrap();

    let rtt = load_rtt(&rtt_path).unwrap();
    let throughput = load_throughput(Some(Path::new("/nonexistent/iperf.json")));
    assert!(throughput.is_none());

    let markers = MarkerPreset::Shaping.markers();
    let out = dir.path().join("r_lineplot.png");
    single_series_chart("TCP Analysis - r", &rtt, throughput.as_ref(), &markers, ThroughputStats::Brief)
        .render(&out)
        .unwrap();
    assert!(fs::metadata(&out).unwrap().len() > 0);
}

#[test]
fn test_overlay_renders_svg() {
    let dir = TempDir::new().unwrap();
    let a = dir.path().join("a.csv");
    let b = dir.path().join("b.csv");
    fs::write(&a, "time,rtt\n0,10\n1,11\n2,12\n").unwrap();
    fs::write(&b, "time,rtt\n0,20\n1,19\n2,21\n").unwrap();

    let series = vec![
        OverlaySeries::new(0, load_rtt(&a).unwrap(), None),
        OverlaySeries::new(1, load_rtt(&b).unwrap().with_label("bbr"), None),
    ];
    let out = dir.path().join("cmp.svg");
    overlay_chart(&series, &MarkerPreset::Compact.markers())
        .unwrap()
        .render(&out)
        .unwrap();

    let svg = fs::read_to_string(&out).unwrap();
    assert!(svg.contains("RTT - bbr"));
    assert!(svg.contains("a Stats:"));
    assert!(svg.contains("bbr Stats:"));
}
