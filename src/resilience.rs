// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Retry policy for failed fetch-and-process passes.
//!
//! The driver never inspects errors itself. It hands every error that
//! escapes a pass to [`RetryPolicy::decide`] and acts on the
//! [`RetryDecision`]:
//!
//! | Error | Decision |
//! |-------|----------|
//! | expired file reference | `RetryImmediate` (re-fetch from the same cursor) |
//! | flood control, hint `n` seconds | `RetryAfter(n + padding)` |
//! | flood control, no hint | `RetryAfter(fallback)` |
//! | anything else | `Fatal` |
//!
//! Oversized bodies never get here unless the split resend failed as well;
//! the forwarder handles them locally.

use crate::error::{RemoteError, ReplicationError};
use std::time::Duration;

/// What to do after a failed pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Re-run the pass right away.
    RetryImmediate,
    /// Sleep, then re-run the pass.
    RetryAfter(Duration),
    /// Abort the process.
    Fatal,
}

/// Classifies errors into retry decisions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Added to the service-provided flood wait.
    pub flood_padding: Duration,
    /// Used when flood control carries no wait hint.
    pub flood_fallback: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            flood_padding: Duration::from_secs(1),
            flood_fallback: Duration::from_secs(100),
        }
    }
}

impl RetryPolicy {
    /// Fast policy for tests.
    pub fn testing() -> Self {
        Self {
            flood_padding: Duration::from_millis(1),
            flood_fallback: Duration::from_millis(10),
        }
    }

    /// Decide how to handle `error`.
    pub fn decide(&self, error: &ReplicationError) -> RetryDecision {
        match error.remote_error() {
            Some(RemoteError::ExpiredReference) => RetryDecision::RetryImmediate,
            Some(RemoteError::RateLimited {
                wait_seconds: Some(secs),
                ..
            }) => RetryDecision::RetryAfter(Duration::from_secs(*secs) + self.flood_padding),
            Some(RemoteError::RateLimited {
                wait_seconds: None,
                ..
            }) => RetryDecision::RetryAfter(self.flood_fallback),
            Some(RemoteError::TooLong) | Some(RemoteError::Other(_)) | None => RetryDecision::Fatal,
        }
    }
}
