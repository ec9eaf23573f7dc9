// File: crates/stream-core/src/error.rs
// Summary: Configuration errors. Rendering paths use anyhow; drawing itself degrades instead of failing.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("at least one series must be configured")]
    NoSeries,

    #[error("series key `{0}` is configured more than once")]
    DuplicateSeries(String),

    #[error("series `{key}` has an unrecognized color `{color}`")]
    InvalidColor { key: String, color: String },

    #[error("`{field}` must be a positive finite number, got {value}")]
    InvalidSize { field: &'static str, value: f64 },

    #[error("margins must be non-negative finite numbers")]
    InvalidMargins,

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
