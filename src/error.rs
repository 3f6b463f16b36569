// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Error types for the topic replicator.
//!
//! Errors are split by where they originate: the remote messaging platform
//! ([`RemoteError`], raised by a [`RemotePlatform`](crate::remote::RemotePlatform)
//! implementation) and everything local to this crate ([`ReplicationError`]).
//!
//! # Error Categories
//!
//! | Error Type | Retryable | Description |
//! |------------|-----------|-------------|
//! | `Remote(ExpiredReference)` | Yes, immediately | Media handle went stale before download |
//! | `Remote(RateLimited)` | Yes, after a wait | Flood control from the platform |
//! | `Remote(TooLong)` | No | Only reaches here if the split resend failed too |
//! | `Remote(Other)` | No | Anything else the platform reports |
//! | `Staging` | No | Local filesystem failure while staging media |
//! | `CursorPersist` | No | Cursor could not be written (needs operator attention) |
//! | `Config` | No | Configuration invalid |
//! | `InvalidLink` | No | Source/destination link could not be parsed |
//!
//! # Retry Behavior
//!
//! [`ReplicationError::is_retryable()`] answers the yes/no question. The
//! driver asks [`RetryPolicy`](crate::resilience::RetryPolicy) instead, which
//! also says how long to wait.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for replication operations.
pub type Result<T> = std::result::Result<T, ReplicationError>;

/// Failures raised by the remote messaging platform.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// A file reference listed with a message expired before the download
    /// finished. Re-fetching the message yields a fresh reference.
    #[error("file reference expired")]
    ExpiredReference,

    /// Flood control. `wait_seconds` is the service's hint, when it gave one.
    #[error("rate limited: {message}")]
    RateLimited {
        wait_seconds: Option<u64>,
        message: String,
    },

    /// The message body exceeds the platform's length limit.
    #[error("message body exceeds the platform length limit")]
    TooLong,

    /// Any other platform failure.
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// Flood control with a wait hint.
    pub fn flood(wait_seconds: u64) -> Self {
        Self::RateLimited {
            wait_seconds: Some(wait_seconds),
            message: format!("A wait of {} seconds is required", wait_seconds),
        }
    }

    /// Short label for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ExpiredReference => "expired_reference",
            Self::RateLimited { .. } => "rate_limited",
            Self::TooLong => "too_long",
            Self::Other(_) => "other",
        }
    }
}

/// Errors that can occur while replicating a pair.
#[derive(Error, Debug)]
pub enum ReplicationError {
    /// The remote platform rejected a fetch, download or send.
    #[error("Remote error ({operation}): {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: RemoteError,
    },

    /// Staging directory or artifact could not be prepared.
    #[error("Staging error at {}: {source}", path.display())]
    Staging {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The cursor could not be durably written.
    ///
    /// Fatal: the staged data for the message is kept so a restart can
    /// resume without downloading it again.
    #[error("Cursor persist error at {}: {source}", path.display())]
    CursorPersist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid or missing configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source or destination link could not be parsed.
    #[error("Invalid link: {0}")]
    InvalidLink(String),
}

impl ReplicationError {
    /// Wrap a platform error with the operation that raised it.
    pub fn remote(operation: &'static str, source: RemoteError) -> Self {
        Self::Remote { operation, source }
    }

    /// Create a staging error for `path`.
    pub fn staging(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Staging {
            path: path.into(),
            source,
        }
    }

    /// The platform error, if this is one.
    pub fn remote_error(&self) -> Option<&RemoteError> {
        match self {
            Self::Remote { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Remote { source, .. } => source.kind(),
            Self::Staging { .. } => "staging",
            Self::CursorPersist { .. } => "cursor_persist",
            Self::Config(_) => "config",
            Self::InvalidLink(_) => "invalid_link",
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Remote { source, .. } => matches!(
                source,
                RemoteError::ExpiredReference | RemoteError::RateLimited { .. }
            ),
            Self::Staging { .. } => false,
            Self::CursorPersist { .. } => false, // Local disk issues need attention
            Self::Config(_) => false,
            Self::InvalidLink(_) => false,
        }
    }
}
