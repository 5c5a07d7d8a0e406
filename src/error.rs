//! Error types and handling infrastructure for flowless.
//!
//! This module provides a centralized error type using `thiserror`. The binary layers
//! `anyhow` context on top; inside a running screen every error ends up on the status line.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flowless operations.
#[derive(Error, Debug)]
pub enum FlowlessError {
    /// File system related errors (permission denied, I/O failure, etc.)
    #[error("File operation failed: {message}")]
    FileError {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// File not found specifically (common case for user feedback)
    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Permission denied accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: PathBuf },

    /// A search pattern failed to compile
    #[error("regexp compile error: {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Input stream errors (pipe setup, unreadable stream, ...)
    #[error("Source error: {message}")]
    SourceError { message: String },

    /// Fetching a remote resource failed
    #[error("Remote fetch failed for {url}: {message}")]
    RemoteError { url: String, message: String },

    /// Spawning or talking to a subprocess failed
    #[error("Command `{command}` failed: {source}")]
    ProcessError {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// UI and terminal related errors
    #[error("UI operation failed: {message}")]
    UIError { message: String },

    /// Configuration related errors
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Invalid command line arguments
    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    /// Generic error for cases not covered by specific variants
    #[error("Operation failed: {message}")]
    Other { message: String },
}

/// Standard Result type for flowless operations.
pub type Result<T> = std::result::Result<T, FlowlessError>;

impl FlowlessError {
    /// Create a FileError from an io::Error with additional context
    pub fn file_error(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileError {
            message: message.into(),
            source,
        }
    }

    /// Create an InvalidPattern error for a rejected search pattern
    pub fn invalid_pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidPattern {
            pattern: pattern.into(),
            message: message.into(),
        }
    }

    pub fn source(message: impl Into<String>) -> Self {
        Self::SourceError {
            message: message.into(),
        }
    }

    pub fn remote(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::RemoteError {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn process(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::ProcessError {
            command: command.into(),
            source,
        }
    }

    /// Create a UIError with a descriptive message
    pub fn ui(message: impl Into<String>) -> Self {
        Self::UIError {
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create a generic Other error with a descriptive message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

// Automatic conversion from io::Error to FlowlessError
impl From<std::io::Error> for FlowlessError {
    fn from(err: std::io::Error) -> Self {
        let message = match err.kind() {
            std::io::ErrorKind::NotFound => "File not found",
            std::io::ErrorKind::PermissionDenied => "Permission denied",
            _ => "IO operation failed",
        };
        Self::FileError {
            message: message.to_string(),
            source: err,
        }
    }
}
