// SPDX-FileCopyrightText: 2026 ArcheBase
//
// SPDX-License-Identifier: MulanPSL-2.0

//! Core error types for gliderproc.
//!
//! Errors fall into four groups:
//! - Configuration (environment, root directories, config file)
//! - Deployment discovery (see [`LocateError`])
//! - Deployment inputs and metadata
//! - External backend calls and output encoding

use std::path::PathBuf;

use thiserror::Error;

use crate::deployment::LocateError;

/// Errors that can occur while processing glider deployments.
#[derive(Debug, Error)]
pub enum ProcError {
    /// Run-wide configuration problem
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Deployment could not be resolved to its directory tree
    #[error(transparent)]
    Locate(#[from] LocateError),

    /// A directory or file the stage needs does not exist
    #[error("{what} not found: {}", path.display())]
    MissingInput {
        /// Human-readable name of the missing input
        what: String,
        /// Expected location
        path: PathBuf,
    },

    /// Deployment YAML could not be read or parsed
    #[error("Invalid deployment metadata {}: {message}", path.display())]
    Metadata {
        /// YAML file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// External decoder or merge call failed
    #[error("{operation} backend error: {message}")]
    Backend {
        /// Operation that failed ("decode", "merge")
        operation: String,
        /// Error message
        message: String,
    },

    /// Output file encoding failed
    #[error("{format} encode error: {message}")]
    Encode {
        /// Output format ("netCDF", "CSV")
        format: String,
        /// Error message
        message: String,
    },

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProcError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        ProcError::Config {
            message: message.into(),
        }
    }

    /// Create a missing input error.
    pub fn missing(what: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        ProcError::MissingInput {
            what: what.into(),
            path: path.into(),
        }
    }

    /// Create a metadata error.
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ProcError::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a backend error.
    pub fn backend(operation: impl Into<String>, message: impl Into<String>) -> Self {
        ProcError::Backend {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Create an encode error.
    pub fn encode(format: impl Into<String>, message: impl Into<String>) -> Self {
        ProcError::Encode {
            format: format.into(),
            message: message.into(),
        }
    }

    /// Get structured fields for logging.
    pub fn log_fields(&self) -> Vec<(&'static str, String)> {
        match self {
            ProcError::Config { message } => vec![("message", message.clone())],
            ProcError::Locate(err) => vec![("reason", err.reason().to_string())],
            ProcError::MissingInput { what, path } => {
                vec![("what", what.clone()), ("path", path.display().to_string())]
            }
            ProcError::Metadata { path, message } => {
                vec![("path", path.display().to_string()), ("message", message.clone())]
            }
            ProcError::Backend { operation, message } => {
                vec![("operation", operation.clone()), ("message", message.clone())]
            }
            ProcError::Encode { format, message } => {
                vec![("format", format.clone()), ("message", message.clone())]
            }
            ProcError::Io(err) => vec![("message", err.to_string())],
        }
    }
}

impl From<csv::Error> for ProcError {
    fn from(err: csv::Error) -> Self {
        ProcError::encode("CSV", err.to_string())
    }
}

/// Result type for gliderproc operations.
pub type Result<T> = std::result::Result<T, ProcError>;
