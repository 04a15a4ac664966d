use std::path::PathBuf;

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum ClipError {
    /// The input point cloud or the polygon file could not be read.
    #[error("failed to {operation} {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// The output point cloud could not be created or written.
    #[error("failed to {operation} {}: {source}", path.display())]
    SinkWrite {
        path: PathBuf,
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("keep-mask has {mask} entries but the chunk has {points} points")]
    MaskLength { points: usize, mask: usize },
}

impl ClipError {
    pub fn source_read(
        path: impl Into<PathBuf>,
        operation: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::SourceRead {
            path: path.into(),
            operation,
            source: source.into(),
        }
    }

    pub fn sink_write(
        path: impl Into<PathBuf>,
        operation: &'static str,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::SinkWrite {
            path: path.into(),
            operation,
            source: source.into(),
        }
    }
}
