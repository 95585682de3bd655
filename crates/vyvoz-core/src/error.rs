// SPDX-FileCopyrightText: 2026 Vyvoz Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Vyvoz intake bot.

use thiserror::Error;

/// The primary error type used across all Vyvoz adapter traits and core operations.
#[derive(Debug, Error)]
pub enum VyvozError {
    /// Configuration errors (invalid TOML, missing credentials, bad routing table).
    #[error("configuration error: {0}")]
    Config(String),

    /// Record store errors (database connection, query failure, constraint violation).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Transport errors (connection failure, message delivery, file download).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Failures of the external document, upload, or mail services.
    #[error("{sink} error: {message}")]
    Sink {
        sink: String,
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Adapter health check failed.
    #[error("health check failed for {name}: {source}")]
    HealthCheckFailed {
        name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Operation timed out.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: std::time::Duration },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl VyvozError {
    /// Shorthand for a [`VyvozError::Sink`] without an underlying source.
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Sink {
            sink: sink.into(),
            message: message.into(),
            source: None,
        }
    }
}
