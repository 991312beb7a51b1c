//! Output file naming

use std::path::{Path, PathBuf};

/// File name without directory or extension, e.g. `runs/cubic.csv` -> `cubic`.
pub fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "capture".to_string())
}

/// `<stem>_with_throughput.png` when throughput was requested, else `<stem>_lineplot.png`.
pub fn lineplot_path(outdir: &Path, rtt_file: &Path, with_throughput: bool) -> PathBuf {
    let suffix = if with_throughput { "_with_throughput" } else { "_lineplot" };
    outdir.join(format!("{}{}.png", file_stem(rtt_file), suffix))
}

pub fn analysis_path(outdir: &Path, rtt_file: &Path) -> PathBuf {
    outdir.join(format!("{}_analysis.png", file_stem(rtt_file)))
}

pub const DEFAULT_COMPARISON_FILE: &str = "rtt_comparison.png";

pub fn is_svg(path: &Path) -> bool {
    path.extension()
        .map(|e| e.eq_ignore_ascii_case("svg"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        let rtt = Path::new("/data/runs/cubic_run1.csv");
        assert_eq!(file_stem(rtt), "cubic_run1");
        assert_eq!(
            lineplot_path(Path::new("."), rtt, false),
            Path::new("./cubic_run1_lineplot.png")
        );
        assert_eq!(
            lineplot_path(Path::new("out"), rtt, true),
            Path::new("out/cubic_run1_with_throughput.png")
        );
        assert_eq!(
            analysis_path(Path::new("."), rtt),
            Path::new("./cubic_run1_analysis.png")
        );
    }

    #[test]
    fn test_svg_detection() {
        assert!(is_svg(Path::new("a.SVG")));
        assert!(!is_svg(Path::new("a.png")));
        assert!(!is_svg(Path::new("svg")));
    }
}
