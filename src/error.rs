//! Error types for the fluxfit resolution and patch pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while resolving, rendering, patching or writing a GitOps tree.
#[derive(Debug, Error)]
pub enum FluxfitError {
    /// No cluster entry point could be located in the working tree.
    #[error("Cluster not found: {0}")]
    NotFound(String),

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A manifest was malformed or of an unsupported kind.
    #[error("Failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// A HelmRelease source reference could not be resolved.
    #[error("Cannot resolve chart for release {release}: {message}")]
    Resolution { release: String, message: String },

    /// A chart could not be loaded or rendered.
    #[error("Failed to render chart {}: {message}", chart.display())]
    Render { chart: PathBuf, message: String },

    /// A recommended CPU or memory value is not a valid quantity.
    #[error("Invalid quantity '{value}': {message}")]
    QuantityParse { value: String, message: String },

    /// A changed document is located inside a chart's source directory.
    #[error("Refusing to write {} inside chart {}", path.display(), chart.display())]
    ReadOnlyLocation { path: PathBuf, chart: PathBuf },

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FluxfitError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self::Parse {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether the pipeline recovers from this error locally.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}

/// Result type alias for fluxfit operations.
pub type Result<T> = std::result::Result<T, FluxfitError>;
