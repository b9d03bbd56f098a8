// Error types for mailswap

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid capture: {0}")]
    InvalidCapture(String),

    #[error("forwarding failed: {0}")]
    Forward(String),
}

pub type Result<T> = std::result::Result<T, Error>;
