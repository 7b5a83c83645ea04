//! Error type shared by the loaders, the renderers and the experiment driver.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading result tables or producing charts.
#[derive(Debug, Error)]
pub enum PlotError {
    /// Input file does not exist
    #[error("File {} not found", .0.display())]
    MissingInput(PathBuf),

    /// One or more required columns are absent from the header
    #[error(
        "{} must contain columns {{{}}} (missing: {})",
        .path.display(),
        .required.join(", "),
        .missing.join(", ")
    )]
    InvalidSchema {
        path: PathBuf,
        required: Vec<String>,
        missing: Vec<String>,
    },

    /// A cell could not be parsed into the expected type
    #[error("Failed to parse {}: {}", .path.display(), .source)]
    MalformedInput {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Header present, no data rows
    #[error("{} has no data rows", .path.display())]
    EmptyInput { path: PathBuf },

    /// Smoothing window is longer than the series
    #[error(
        "{} has {} rows, not enough for a rolling window of {}",
        .path.display(),
        .rows,
        .window
    )]
    InsufficientRows {
        path: PathBuf,
        rows: usize,
        window: usize,
    },

    /// SVG could not be rasterised
    #[error("Failed to render {}: {}", .path.display(), .reason)]
    Render { path: PathBuf, reason: String },

    #[error("I/O error on {}: {}", .path.display(), .source)]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {}", .path.display(), .source)]
    CsvWrite {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to serialize {}: {}", .path.display(), .source)]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl PlotError {
    /// Whether the error only skips one rendering step (reported as a warning)
    /// rather than aborting the program.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlotError::MissingInput(_)
                | PlotError::InvalidSchema { .. }
                | PlotError::MalformedInput { .. }
                | PlotError::EmptyInput { .. }
                | PlotError::InsufficientRows { .. }
        )
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PlotError::Io { path: path.into(), source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_message_lists_required_columns_in_order() {
        let err = PlotError::InvalidSchema {
            path: PathBuf::from("data/csv/hc_history.csv"),
            required: vec!["iter".to_string(), "score".to_string()],
            missing: vec!["score".to_string()],
        };

        assert_eq!(
            err.to_string(),
            "data/csv/hc_history.csv must contain columns {iter, score} (missing: score)"
        );
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_io_is_fatal() {
        let err = PlotError::io(
            "data/png",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert!(!err.is_recoverable());
    }
}
