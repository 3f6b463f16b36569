// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Metrics for observability.
//!
//! Exports Prometheus-compatible metrics through the `metrics` facade for:
//! - Fetch passes and messages fetched
//! - Forwarded and skipped messages
//! - Downloads vs. dedup hits
//! - Flood waits and expired-reference retries
//! - Cursor persistence and position
//!
//! # Metric Naming Convention
//!
//! All metrics are prefixed with `replicator_` and follow Prometheus conventions:
//! - Counters end in `_total`
//! - Gauges represent current state
//! - Histograms track distributions (duration, size)
//!
//! No recorder is installed here; the embedding binary picks one.

use metrics::{counter, gauge, histogram};
use std::time::Duration;

/// Record one fetch pass and how many messages it returned.
pub fn record_fetch(pair: &str, messages: usize, duration: Duration) {
    counter!("replicator_fetch_passes_total", "pair" => pair.to_string()).increment(1);
    counter!("replicator_messages_fetched_total", "pair" => pair.to_string()).increment(messages as u64);
    histogram!("replicator_fetch_duration_seconds", "pair" => pair.to_string())
        .record(duration.as_secs_f64());
}

/// Record a forwarded message by media kind.
pub fn record_forwarded(pair: &str, kind: &str) {
    counter!("replicator_messages_forwarded_total", "pair" => pair.to_string(), "kind" => kind.to_string()).increment(1);
}

/// Record a skipped message by reason.
pub fn record_skipped(pair: &str, reason: &str) {
    counter!("replicator_messages_skipped_total", "pair" => pair.to_string(), "reason" => reason.to_string()).increment(1);
}

/// Record an oversized body that was split into `parts` messages.
pub fn record_split_send(pair: &str, parts: usize) {
    counter!("replicator_split_sends_total", "pair" => pair.to_string()).increment(1);
    histogram!("replicator_split_parts", "pair" => pair.to_string()).record(parts as f64);
}

/// Record a media download.
pub fn record_download(pair: &str, kind: &str, bytes: u64) {
    counter!("replicator_downloads_total", "pair" => pair.to_string(), "kind" => kind.to_string()).increment(1);
    counter!("replicator_downloaded_bytes_total", "pair" => pair.to_string()).increment(bytes);
}

/// Record a download skipped because a size-matching artifact was staged.
pub fn record_dedup_hit(pair: &str) {
    counter!("replicator_dedup_hits_total", "pair" => pair.to_string()).increment(1);
}

/// Record a flood-control wait.
pub fn record_flood_wait(pair: &str, wait: Duration) {
    counter!("replicator_flood_waits_total", "pair" => pair.to_string()).increment(1);
    histogram!("replicator_flood_wait_seconds", "pair" => pair.to_string()).record(wait.as_secs_f64());
}

/// Record a pass retried because a file reference expired.
pub fn record_expired_reference(pair: &str) {
    counter!("replicator_expired_reference_retries_total", "pair" => pair.to_string()).increment(1);
}

/// Record cursor persistence.
pub fn record_cursor_persist(pair: &str, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!("replicator_cursor_persists_total", "pair" => pair.to_string(), "status" => status).increment(1);
}

/// Record the current cursor position.
pub fn set_cursor(pair: &str, cursor: i64) {
    gauge!("replicator_cursor", "pair" => pair.to_string()).set(cursor as f64);
}

/// Record a pair reaching the fully-synced state.
pub fn record_pair_completed(pair: &str, passes: u64) {
    counter!("replicator_pairs_completed_total", "pair" => pair.to_string()).increment(1);
    histogram!("replicator_pair_passes", "pair" => pair.to_string()).record(passes as f64);
}

/// Record a fatal error by type.
pub fn record_fatal(pair: &str, error_type: &str) {
    counter!("replicator_fatal_errors_total", "pair" => pair.to_string(), "type" => error_type.to_string()).increment(1);
}
