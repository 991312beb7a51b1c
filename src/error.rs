//! Error types for the RTT analysis tools

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No valid RTT samples in {0}")]
    NoSamples(PathBuf),

    #[error("At most {max} RTT series can be compared at once (got {got})")]
    TooManySeries { max: usize, got: usize },

    #[error("Invalid marker definition: {0}")]
    InvalidMarkers(String),

    #[error("Failed to render chart: {0}")]
    Render(String),
}

impl AnalysisError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
