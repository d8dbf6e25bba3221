use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions. Rejecting a dictionary entry is not one of them; see
/// [`crate::pipeline::SkipReason`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to open {path:?}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read schema file {path:?}: {source}")]
    SchemaRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse schema YAML: {0}")]
    SchemaParse(#[from] serde_yaml::Error),

    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("malformed dictionary entry #{index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    #[error("reference to undeclared entity &{0};")]
    UnknownEntity(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
