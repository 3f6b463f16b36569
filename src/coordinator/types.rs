// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Pair driver state and run reports.
//!
//! # State Transitions
//!
//! ```text
//!            ┌──────────── retry (expired ref / flood wait) ───────┐
//!            ↓                                                     │
//!        Fetching ──(messages)──→ Processing(id) ──(ok, next)──┐   │
//!            │  ↑                       │                      │   │
//!            │  └───────(batch done)────┴──────────────────────┘   │
//!            │                          │                          │
//!            │                          └──(retryable error)───────┘
//!            │ (cursor unchanged)       │
//!            ↓                          │ (fatal error)
//!         Cleanup                       ↓
//!            │                        Failed
//!            ↓
//!          Done
//! ```
//!
//! - **Fetching**: requesting the next batch after the cursor.
//! - **Processing**: forwarding one message; the id is carried along.
//! - **Cleanup**: pass left the cursor unchanged; wiping staging.
//! - **Done**: pair fully synced.
//! - **Failed**: a fatal error escaped the pair loop.

use crate::links::ReplicationPair;

/// State of one pair's replication loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairState {
    Fetching,
    Processing(i64),
    Cleanup,
    Done,
    Failed,
}

impl PairState {
    /// Whether the pair loop has exited.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PairState::Done | PairState::Failed)
    }
}

impl std::fmt::Display for PairState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairState::Fetching => write!(f, "Fetching"),
            PairState::Processing(id) => write!(f, "Processing({})", id),
            PairState::Cleanup => write!(f, "Cleanup"),
            PairState::Done => write!(f, "Done"),
            PairState::Failed => write!(f, "Failed"),
        }
    }
}

/// Summary of one pair's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairReport {
    pub pair: ReplicationPair,
    /// Cursor value when the pair loop exited.
    pub final_cursor: i64,
    /// Messages that produced at least one send.
    pub forwarded: u64,
    /// Messages skipped (service, poll, ignored, unsupported, empty).
    pub skipped: u64,
    /// Bodies that had to be split after a too-long rejection.
    pub split_sends: u64,
    pub downloads: u64,
    pub dedup_hits: u64,
    pub expired_retries: u64,
    pub flood_waits: u64,
    /// Fetch passes, including the final empty one.
    pub passes: u64,
    pub state: PairState,
}

impl PairReport {
    pub(crate) fn new(pair: ReplicationPair, cursor: i64) -> Self {
        Self {
            pair,
            final_cursor: cursor,
            forwarded: 0,
            skipped: 0,
            split_sends: 0,
            downloads: 0,
            dedup_hits: 0,
            expired_retries: 0,
            flood_waits: 0,
            passes: 0,
            state: PairState::Fetching,
        }
    }

    /// Messages handled (forwarded or skipped).
    pub fn handled(&self) -> u64 {
        self.forwarded + self.skipped
    }
}
