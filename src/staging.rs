// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Local staging of downloaded media.
//!
//! # Layout
//!
//! ```text
//! <data_dir>/<group_id>/<topic_id | none>/
//! ├── offset.txt          cursor (see crate::cursor)
//! └── staging/
//!     └── <message_id>/   one in-flight message, at most one artifact
//! ```
//!
//! A message's directory is discarded only after its cursor advance has been
//! persisted. Once a pair is fully synced the whole `staging/` directory is
//! wiped and recreated empty, so disk usage is bounded by in-flight work.

use crate::cursor::CursorStore;
use crate::links::Endpoint;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const STAGING_DIR: &str = "staging";
const NO_TOPIC_DIR: &str = "none";

/// Per-pair directory holding the cursor file and the staging root.
pub fn pair_dir(data_dir: &Path, source: &Endpoint) -> PathBuf {
    let topic = source
        .topic_id
        .map(|t| t.to_string())
        .unwrap_or_else(|| NO_TOPIC_DIR.to_string());
    data_dir.join(source.group_id.to_string()).join(topic)
}

/// Cursor store for the pair replicating from `source`.
pub fn cursor_store(data_dir: &Path, source: &Endpoint) -> CursorStore {
    CursorStore::new(pair_dir(data_dir, source))
}

/// Staging root for one replication pair.
#[derive(Debug, Clone)]
pub struct StagingArea {
    root: PathBuf,
}

impl StagingArea {
    /// Staging area for the pair replicating from `source`.
    pub fn for_pair(data_dir: &Path, source: &Endpoint) -> Self {
        Self {
            root: pair_dir(data_dir, source).join(STAGING_DIR),
        }
    }

    /// Staging root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for message `id`. Not created.
    pub fn message_dir(&self, id: i64) -> PathBuf {
        self.root.join(id.to_string())
    }

    /// Create the staging root if needed.
    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    /// Create and return the directory for message `id`.
    pub async fn prepare_message_dir(&self, id: i64) -> std::io::Result<PathBuf> {
        let dir = self.message_dir(id);
        tokio::fs::create_dir_all(&dir).await?;
        Ok(dir)
    }

    /// Remove everything staged for message `id`. Best effort.
    pub async fn discard(&self, id: i64) {
        let dir = self.message_dir(id);
        match tokio::fs::remove_dir_all(&dir).await {
            Ok(()) => debug!(message_id = id, "Discarded staged data"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(message_id = id, path = %dir.display(), error = %e, "Failed to discard staged data"),
        }
    }

    /// Wipe the staging root and recreate it empty.
    pub async fn reset(&self) -> std::io::Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }
        self.ensure_root().await
    }

    /// Ids of messages that currently have staged data.
    pub async fn in_flight(&self) -> std::io::Result<Vec<i64>> {
        let mut ids = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(ids),
            Err(e) => return Err(e),
        };
        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = entry.file_name().to_str().and_then(|n| n.parse::<i64>().ok()) {
                ids.push(id);
            }
        }
        ids.sort_unstable();
        Ok(ids)
    }
}

/// Reduce a remote filename to one safe path component.
///
/// Falls back to `default` when nothing usable remains.
pub fn sanitize_file_name(name: &str, default: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        default.to_string()
    } else {
        cleaned.to_string()
    }
}
