use std::path::PathBuf;

/// Fatal failures while loading the transaction file.
///
/// Any of these aborts the render pass; callers are expected to surface the
/// message to the user rather than fall back to partial results.
#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("data file not found: {}", .0.display())]
    MissingFile(PathBuf),

    #[error("could not read {}: {reason}", .path.display())]
    Unreadable { path: PathBuf, reason: String },

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("unparseable order_purchase_timestamp value: {value:?}")]
    InvalidTimestamp { value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    #[error("Data load error: {0}")]
    DataLoad(#[from] DataLoadError),

    #[error("DuckDB error: {0}")]
    DuckDb(#[from] duckdb::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, DashboardError>;
