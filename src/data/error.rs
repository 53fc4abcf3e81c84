use std::path::PathBuf;

use thiserror::Error;

/// Fatal data-layer failures. Any of these halts the session's pipeline.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("Dataset not found at path: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {} as tabular data: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Failed to read parquet file {}", path.display())]
    Parquet {
        path: PathBuf,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("Failed to decode column data in {}", path.display())]
    Arrow {
        path: PathBuf,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("No columns to parse from {}", .0.display())]
    Empty(PathBuf),

    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("Missing required columns in the dataset: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Failed to export to {}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
