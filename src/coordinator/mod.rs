// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Replication engine coordinator.
//!
//! The orchestrator that ties together:
//! - The platform client via [`crate::remote::RemotePlatform`]
//! - Message handling via [`crate::forwarder::MessageForwarder`]
//! - Cursor persistence via [`crate::cursor::CursorStore`]
//! - Retry decisions via [`crate::resilience::RetryPolicy`]
//!
//! # Architecture
//!
//! Pairs run strictly one after another in configured order, and within a
//! pair messages are handled one at a time in ascending id order. There is
//! exactly one remote call in flight at any moment, so flood waits stall
//! everything rather than fanning out into concurrent retries.

mod pair_driver;
mod types;

pub use types::{PairReport, PairState};

use crate::config::{MessageFilters, ReplicationSettings, ReplicatorConfig};
use crate::error::Result;
use crate::forwarder::MessageForwarder;
use crate::links::ReplicationPair;
use crate::remote::RemotePlatform;
use crate::resilience::RetryPolicy;
use pair_driver::PairDriver;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, info_span, Instrument};

/// The replication engine.
///
/// Owns the immutable inputs (pairs, compiled filters, settings) and the
/// shared platform client. Per-pair state lives on disk under `data_dir`.
pub struct ReplicationEngine<P: RemotePlatform> {
    pairs: Vec<ReplicationPair>,
    forwarder: MessageForwarder<P>,
    policy: RetryPolicy,
    batch_limit: usize,
    data_dir: PathBuf,
}

impl<P: RemotePlatform> ReplicationEngine<P> {
    /// Create an engine from already-parsed inputs.
    pub fn new(
        pairs: Vec<ReplicationPair>,
        filters: MessageFilters,
        settings: &ReplicationSettings,
        data_dir: impl Into<PathBuf>,
        platform: Arc<P>,
    ) -> Self {
        Self {
            pairs,
            forwarder: MessageForwarder::new(platform, filters, settings.max_message_length),
            policy: settings.retry_policy(),
            batch_limit: settings.effective_batch_limit(),
            data_dir: data_dir.into(),
        }
    }

    /// Create an engine from configuration, parsing links and compiling
    /// patterns up front.
    pub fn from_config(config: &ReplicatorConfig, platform: Arc<P>) -> Result<Self> {
        let pairs = config.pairs()?;
        let filters = config.patterns.compile()?;
        Ok(Self::new(
            pairs,
            filters,
            &config.settings,
            config.storage.data_dir(),
            platform,
        ))
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pairs in processing order.
    pub fn pairs(&self) -> &[ReplicationPair] {
        &self.pairs
    }

    /// Root of cursor files and staging.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Fetch messages per pass.
    pub fn batch_limit(&self) -> usize {
        self.batch_limit
    }

    /// Replicate one pair until it is fully synced.
    pub async fn replicate_pair(&self, pair: &ReplicationPair) -> Result<PairReport> {
        let span = info_span!("replicate_pair", pair = %pair);
        PairDriver::new(
            *pair,
            &self.forwarder,
            &self.policy,
            self.batch_limit,
            &self.data_dir,
        )
        .run()
        .instrument(span)
        .await
    }

    /// Replicate every pair in order.
    ///
    /// Stops at the first fatal error; pairs after it are not started.
    pub async fn run(&self) -> Result<Vec<PairReport>> {
        info!(count = self.pairs.len(), "Loaded replication pairs");
        for (i, pair) in self.pairs.iter().enumerate() {
            info!("{}. {}", i + 1, pair);
        }

        let mut reports = Vec::with_capacity(self.pairs.len());
        for (i, pair) in self.pairs.iter().enumerate() {
            info!("Handling pair number {}", i + 1);
            reports.push(self.replicate_pair(pair).await?);
        }

        info!(pairs = reports.len(), "All pairs fully synced");
        Ok(reports)
    }

    /// Like [`run`](Self::run), but a fatal error terminates the process
    /// with exit status 1.
    pub async fn run_or_exit(&self) -> Vec<PairReport> {
        match self.run().await {
            Ok(reports) => reports,
            Err(e) => {
                error!(error = ?e, "Replication aborted");
                std::process::exit(1);
            }
        }
    }
}
