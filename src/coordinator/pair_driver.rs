// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Per-pair replication loop.
//!
//! Each pass:
//! 1. Resolves (once) and caches the source and destination handles
//! 2. Fetches up to `batch_limit` messages after the cursor, ascending
//! 3. Forwards each message, persists the cursor, then discards its staging
//!
//! A pass that leaves the cursor where it started means the pair is fully
//! synced: staging is wiped and recreated, the cursor re-persisted, and the
//! loop exits in [`PairState::Done`].
//!
//! Errors escaping a pass go through [`RetryPolicy::decide`]. Retries always
//! restart from the persisted cursor, so nothing already sent is sent twice.

use super::types::{PairReport, PairState};
use crate::cursor::CursorStore;
use crate::error::{ReplicationError, Result};
use crate::forwarder::{Destination, ForwardOutcome, MediaFetch, MessageForwarder};
use crate::links::ReplicationPair;
use crate::metrics;
use crate::remote::RemotePlatform;
use crate::resilience::{RetryDecision, RetryPolicy};
use crate::staging::StagingArea;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Drives one pair from its persisted cursor to fully synced.
pub(crate) struct PairDriver<'a, P: RemotePlatform> {
    pair: ReplicationPair,
    label: String,
    forwarder: &'a MessageForwarder<P>,
    policy: &'a RetryPolicy,
    batch_limit: usize,
    cursor_store: CursorStore,
    staging: StagingArea,
    /// Resolved (source, destination) handles, cached for the pair.
    handles: Option<(P::Handle, P::Handle)>,
    cursor: i64,
    /// Last message yielded by the current pass.
    last_seen_id: Option<i64>,
    report: PairReport,
}

impl<'a, P: RemotePlatform> PairDriver<'a, P> {
    pub(crate) fn new(
        pair: ReplicationPair,
        forwarder: &'a MessageForwarder<P>,
        policy: &'a RetryPolicy,
        batch_limit: usize,
        data_dir: &Path,
    ) -> Self {
        Self {
            pair,
            label: pair.source.to_string(),
            forwarder,
            policy,
            batch_limit,
            cursor_store: crate::staging::cursor_store(data_dir, &pair.source),
            staging: StagingArea::for_pair(data_dir, &pair.source),
            handles: None,
            cursor: 0,
            last_seen_id: None,
            report: PairReport::new(pair, 0),
        }
    }

    /// Run the pair to completion.
    ///
    /// Returns the report on [`PairState::Done`]; a fatal error is logged
    /// and returned with the cursor left at the last forwarded message.
    pub(crate) async fn run(mut self) -> Result<PairReport> {
        match self.drive().await {
            Ok(()) => {
                self.report.state = PairState::Done;
                self.report.final_cursor = self.cursor;
                metrics::record_pair_completed(&self.label, self.report.passes);
                info!(
                    cursor = self.cursor,
                    forwarded = self.report.forwarded,
                    skipped = self.report.skipped,
                    passes = self.report.passes,
                    "Pair fully synced"
                );
                Ok(self.report)
            }
            Err(e) => {
                self.report.state = PairState::Failed;
                metrics::record_fatal(&self.label, e.kind());
                error!(
                    cursor = self.cursor,
                    last_seen_id = ?self.last_seen_id,
                    error = ?e,
                    "Fatal error, aborting replication"
                );
                Err(e)
            }
        }
    }

    async fn drive(&mut self) -> Result<()> {
        self.staging
            .ensure_root()
            .await
            .map_err(|e| ReplicationError::staging(self.staging.root(), e))?;

        self.cursor = self.cursor_store.load().await;
        metrics::set_cursor(&self.label, self.cursor);
        info!(cursor = self.cursor, "Resuming from cursor");

        match self.staging.in_flight().await {
            Ok(ids) if !ids.is_empty() => {
                info!(staged = ?ids, "Found staged data from an interrupted run")
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Failed to list staged data"),
        }

        loop {
            let before = self.cursor;
            self.report.state = PairState::Fetching;

            if let Err(e) = self.run_pass().await {
                self.handle_pass_error(e).await?;
                continue;
            }

            if self.cursor == before {
                return self.cleanup().await;
            }
        }
    }

    /// Apply the retry policy; only a fatal decision returns an error.
    async fn handle_pass_error(&mut self, e: ReplicationError) -> Result<()> {
        match self.policy.decide(&e) {
            RetryDecision::RetryImmediate => {
                self.report.expired_retries += 1;
                metrics::record_expired_reference(&self.label);
                match self.last_seen_id {
                    Some(id) => warn!(
                        message_id = id,
                        cursor = self.cursor,
                        error = %e,
                        "Reference expired while handling message, re-fetching"
                    ),
                    None => warn!(
                        cursor = self.cursor,
                        error = %e,
                        "Reference expired before any message was yielded, re-fetching"
                    ),
                }
                Ok(())
            }
            RetryDecision::RetryAfter(wait) => {
                self.report.flood_waits += 1;
                metrics::record_flood_wait(&self.label, wait);
                warn!(
                    wait_secs = wait.as_secs_f64(),
                    cursor = self.cursor,
                    error = %e,
                    "Flood control, sleeping before retry"
                );
                tokio::time::sleep(wait).await;
                Ok(())
            }
            RetryDecision::Fatal => Err(e),
        }
    }

    /// One fetch-and-process pass.
    async fn run_pass(&mut self) -> Result<()> {
        self.last_seen_id = None;
        self.report.passes += 1;

        let (source, destination) = self.resolve_handles().await?;
        let forwarder = self.forwarder;
        let platform = forwarder.platform();

        let started = Instant::now();
        let messages = platform
            .fetch_messages(&source, self.cursor, self.pair.source.topic_id, self.batch_limit)
            .await
            .map_err(|e| ReplicationError::remote("fetch_messages", e))?;
        metrics::record_fetch(&self.label, messages.len(), started.elapsed());
        debug!(count = messages.len(), after = self.cursor, "Fetched batch");

        let dest = Destination {
            handle: &destination,
            topic_id: self.pair.destination.topic_id,
        };

        for message in &messages {
            self.last_seen_id = Some(message.id);

            if message.id <= self.cursor {
                warn!(message_id = message.id, cursor = self.cursor, "Source returned already replicated message, skipping");
                continue;
            }

            self.report.state = PairState::Processing(message.id);
            debug!(message_id = message.id, link = %message.permalink(), "Handling message");

            let outcome = forwarder.forward(message, &dest, &self.staging).await?;
            self.record_outcome(&outcome);
            self.advance(message.id).await?;
        }

        Ok(())
    }

    async fn resolve_handles(&mut self) -> Result<(P::Handle, P::Handle)> {
        if let Some(handles) = &self.handles {
            return Ok(handles.clone());
        }

        let platform = self.forwarder.platform();
        let source = platform
            .resolve_endpoint(self.pair.source.group_id)
            .await
            .map_err(|e| ReplicationError::remote("resolve_endpoint", e))?;
        let destination = platform
            .resolve_endpoint(self.pair.destination.group_id)
            .await
            .map_err(|e| ReplicationError::remote("resolve_endpoint", e))?;
        debug!(source = ?source, destination = ?destination, "Resolved endpoints");

        self.handles = Some((source.clone(), destination.clone()));
        Ok((source, destination))
    }

    /// Durably move the cursor to `id`, then drop the message's staging.
    async fn advance(&mut self, id: i64) -> Result<()> {
        if let Err(source) = self.cursor_store.try_persist(id).await {
            metrics::record_cursor_persist(&self.label, false);
            return Err(ReplicationError::CursorPersist {
                path: self.cursor_store.path(),
                source,
            });
        }
        metrics::record_cursor_persist(&self.label, true);
        metrics::set_cursor(&self.label, id);

        self.cursor = id;
        self.staging.discard(id).await;
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        self.report.state = PairState::Cleanup;
        info!(cursor = self.cursor, "No new messages, cleaning up staging");

        self.staging
            .reset()
            .await
            .map_err(|e| ReplicationError::staging(self.staging.root(), e))?;
        self.cursor_store
            .try_persist(self.cursor)
            .await
            .map_err(|source| ReplicationError::CursorPersist {
                path: self.cursor_store.path(),
                source,
            })?;
        Ok(())
    }

    fn record_outcome(&mut self, outcome: &ForwardOutcome) {
        match outcome {
            ForwardOutcome::Forwarded {
                kind,
                media,
                split_parts,
            } => {
                self.report.forwarded += 1;
                metrics::record_forwarded(&self.label, kind);
                match media {
                    MediaFetch::Downloaded { bytes } => {
                        self.report.downloads += 1;
                        metrics::record_download(&self.label, kind, *bytes);
                    }
                    MediaFetch::Reused => {
                        self.report.dedup_hits += 1;
                        metrics::record_dedup_hit(&self.label);
                    }
                    MediaFetch::NotNeeded => {}
                }
                if *split_parts > 0 {
                    self.report.split_sends += 1;
                    metrics::record_split_send(&self.label, *split_parts);
                }
            }
            ForwardOutcome::Skipped(reason) => {
                self.report.skipped += 1;
                metrics::record_skipped(&self.label, reason.label());
            }
        }
    }
}
