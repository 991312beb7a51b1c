//! Summary statistics for RTT and throughput series

use serde::Serialize;

/// Layout of the throughput stats block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ThroughputStats {
    /// Avg, Max, Min
    #[default]
    Brief,
    /// Avg, Min, Max and the total transferred volume
    Detailed,
}

/// Descriptive statistics of one series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation (n - 1 denominator); `None` below two values.
    pub std_dev: Option<f64>,
}

impl Summary {
    /// Returns `None` for an empty input.
    pub fn of<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let values: Vec<f64> = values.into_iter().collect();
        if values.is_empty() {
            return None;
        }

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        let std_dev = if count > 1 {
            let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64;
            Some(var.sqrt())
        } else {
            None
        };

        Some(Self {
            count,
            mean,
            min,
            max,
            std_dev,
        })
    }

    /// Annotation lines for an RTT series.
    pub fn rtt_lines(&self) -> Vec<String> {
        vec![
            format!("Avg RTT: {:.2} ms", self.mean),
            format!("Min RTT: {:.2} ms", self.min),
            format!("Max RTT: {:.2} ms", self.max),
            match self.std_dev {
                Some(sd) => format!("Std Dev: {:.2} ms", sd),
                None => "Std Dev: n/a".to_string(),
            },
        ]
    }

    /// Annotation lines for a throughput series. `total_mbit` is only shown
    /// in the detailed layout.
    pub fn throughput_lines(&self, layout: ThroughputStats, total_mbit: Option<f64>) -> Vec<String> {
        let avg = format!("Avg Throughput: {:.2} Mbps", self.mean);
        let min = format!("Min Throughput: {:.2} Mbps", self.min);
        let max = format!("Max Throughput: {:.2} Mbps", self.max);
        let mut lines = match layout {
            ThroughputStats::Brief => vec![avg, max, min],
            ThroughputStats::Detailed => vec![avg, min, max],
        };
        if let Some(sd) = self.std_dev {
            lines.push(format!("Std Dev: {:.2} Mbps", sd));
        }
        if let (ThroughputStats::Detailed, Some(total)) = (layout, total_mbit) {
            lines.push(format!("Total Transfer: {:.2} Mb", total));
        }
        lines
    }
}
