use std::{ffi::OsString, io, process::ExitStatus, string::FromUtf8Error};

use glob::{GlobError, PatternError};

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by toolshed operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("command {program:?} exited with {status} (output: {output})")]
    Command {
        program: OsString,
        status: ExitStatus,
        output: String,
    },

    #[error("UTF-8 conversion failed: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("invalid glob pattern: {0}")]
    GlobPattern(#[from] PatternError),

    #[error("glob resolution failed: {0}")]
    Glob(#[from] GlobError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("malformed server log: {0}")]
    LogFormat(String),

    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API request failed with HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("upload error: {0}")]
    Upload(String),
}

impl Error {
    /// The HTTP status behind an API-side failure, if that is what this is.
    pub fn api_status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
