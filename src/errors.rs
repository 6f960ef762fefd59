// src/errors.rs

use thiserror::Error;

pub type ColloquyResult<T> = Result<T, ColloquyError>;

/// Internal error taxonomy. The user-facing failure collapses to a single
/// fixed chat message regardless of variant; these exist for the log file
/// and for callers that care which layer gave up.
#[derive(Debug, Error)]
pub enum ColloquyError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("request error: {0}")]
    Request(String),

    #[error("stream error: {0}")]
    Stream(String),
}

impl ColloquyError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn request_error(msg: impl Into<String>) -> Self {
        Self::Request(msg.into())
    }

    pub fn stream_error(msg: impl Into<String>) -> Self {
        Self::Stream(msg.into())
    }
}
