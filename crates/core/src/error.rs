// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for fl-core operations.

use thiserror::Error;

use crate::backoff::ErrorClass;
use crate::transport::TransportError;

/// All possible errors surfaced by the resilience layer.
///
/// Retryable failures (`Transient`, `Offline`, `Server`) only reach callers
/// once the retry loop has given up on them.
#[derive(Debug, Error)]
pub enum Error {
    #[error("network unavailable: {0}")]
    Transient(String),

    #[error("device is offline")]
    Offline,

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("request rejected ({status}): {message}")]
    Client { status: u16, message: String },

    #[error("session expired\n  hint: sign in again to continue")]
    SessionExpired,

    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),
}

impl Error {
    /// Maps the error onto the class the backoff policy reasons about.
    ///
    /// Local failures (storage, parsing, configuration) are never retried and
    /// therefore land in `ClientError`.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::Transient(_) | Error::Offline => ErrorClass::Transient,
            Error::Server { .. } => ErrorClass::ServerError,
            Error::SessionExpired => ErrorClass::Unauthorized,
            Error::Client { .. }
            | Error::InvalidInput(_)
            | Error::InvalidUrl { .. }
            | Error::Io(_)
            | Error::Json(_)
            | Error::CorruptedData(_) => ErrorClass::ClientError,
        }
    }

    /// Returns true for failures caused by the network rather than the server.
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Transient(_) | Error::Offline)
    }
}

impl From<TransportError> for Error {
    fn from(err: TransportError) -> Self {
        Error::Transient(err.to_string())
    }
}

/// A specialized Result type for fl-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
