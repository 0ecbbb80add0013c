//! @ai:module:intent Define error types for the marginalia scanner
//! @ai:module:layer domain
//! @ai:module:public_api Error, Result
//! @ai:module:stateless true

use std::path::PathBuf;
use thiserror::Error;

/// @ai:intent Unified error type for operations that abort a run
///
/// Recoverable problems inside source files never surface here; they are
/// collected as [`crate::diagnostic::Diagnostic`]s instead.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path does not exist: {0}")]
    MissingPath(PathBuf),

    #[error("Invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    #[error("Invalid glob pattern `{pattern}`: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Invalid meta syntax: {0}")]
    Syntax(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("Invalid inventory: {0}")]
    Inventory(String),

    #[error("Strict mode failure: {collisions} identifier collision(s), {unbound} unbound block(s)")]
    StrictFailure { collisions: usize, unbound: usize },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
