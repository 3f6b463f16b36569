// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! # Topic Replicator
//!
//! Resumable one-way replication of messages from a source group topic into a
//! destination group topic.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────────────┐
//! │                            topic-replicator                               │
//! │                                                                           │
//! │  ┌──────────────────┐   ┌─────────────┐   ┌────────────────────────────┐  │
//! │  │ ReplicationEngine│──►│ PairDriver  │──►│ MessageForwarder           │  │
//! │  │ (pairs in order) │   │ (fetch ≤50) │   │ (classify, dedup, split)   │  │
//! │  └──────────────────┘   └─────────────┘   └────────────────────────────┘  │
//! │                               │ │                      │                  │
//! │                 ┌─────────────┘ └──────┐               ▼                  │
//! │                 ▼                      ▼       ┌──────────────────┐       │
//! │          ┌─────────────┐      ┌─────────────┐  │  RemotePlatform  │       │
//! │          │ CursorStore │      │ RetryPolicy │  │ (fetch/download/ │       │
//! │          │ (offset.txt)│      │             │  │  send)           │       │
//! │          └─────────────┘      └─────────────┘  └──────────────────┘       │
//! └───────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees
//!
//! - The cursor for a pair only moves forward, and only after the message it
//!   names has been handled; a message at or below the cursor is never re-sent.
//! - Staged media for a message is deleted only after the cursor past it is
//!   on disk. Once a pair is fully synced its staging directory is emptied.
//! - Flood control and expired file references are retried; any other error
//!   aborts the run with the cursor at the last handled message.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use topic_replicator::{ReplicationEngine, ReplicatorConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> topic_replicator::Result<()> {
//!     let config = ReplicatorConfig::from_env()?;
//!     let client = Arc::new(MyClient::connect(&config.credentials).await);
//!
//!     let engine = ReplicationEngine::from_config(&config, client)?;
//!     engine.run_or_exit().await;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod cursor;
pub mod error;
pub mod forwarder;
pub mod links;
pub mod message;
pub mod metrics;
pub mod remote;
pub mod resilience;
pub mod splitter;
pub mod staging;

// Re-exports for convenience
pub use config::{MessageFilters, PatternConfig, ReplicationSettings, ReplicatorConfig, StorageConfig};
pub use coordinator::{PairReport, PairState, ReplicationEngine};
pub use cursor::CursorStore;
pub use error::{RemoteError, ReplicationError, Result};
pub use forwarder::{ForwardOutcome, MediaFetch, MessageForwarder, SkipReason};
pub use links::{parse_link, Endpoint, ReplicationPair};
pub use message::{Document, DocumentAttribute, MediaVariant, Photo, RemoteMessage};
pub use remote::{BoxFuture, FileUpload, RemotePlatform, RemoteResult};
pub use resilience::{RetryDecision, RetryPolicy};
pub use splitter::{split_into_parts, split_text};
pub use staging::StagingArea;
