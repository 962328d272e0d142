//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! malformed dependency summaries, unknown dependency vocabulary, external tool
//! failures, IO, JSON, and generic errors.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed dependency summary: {0}")]
    Summary(String),

    #[error("unknown dependency kind '{token}'")]
    UnknownDependency { token: String },

    #[error("dependency label '{label}' not present in legend")]
    UnresolvedLabel { label: char },

    #[error("external tool '{tool}' failed: {detail}")]
    Tool { tool: String, detail: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
