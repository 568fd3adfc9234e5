use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid page url: {0}")]
    Url(#[from] url::ParseError),

    #[error("HTTP {status} for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("robots.txt disallows {0}")]
    Disallowed(String),
}

/// Failure for a single app id. Never aborts the batch.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("app id must be a non-empty string")]
    EmptyId,

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read error: {0}")]
    Read(#[from] std::io::Error),

    #[error("invalid settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no app IDs found in {}", .0.display())]
    Empty(PathBuf),
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("no app data was successfully extracted ({requested} requested)")]
    NoResults { requested: usize },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("record {index} does not serialize to an object")]
    NotAnObject { index: usize },
}
