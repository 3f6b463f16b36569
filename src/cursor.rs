// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Cursor persistence for replication pairs.
//!
//! Stores the id of the last fully replicated message for one source
//! endpoint as a decimal integer in a plain-text file (`offset.txt`).
//!
//! ## Cursor Semantics
//!
//! The cursor stores the **last successfully processed** message id.
//! On restart, we resume from `cursor + 1` (exclusive fetch).
//!
//! ```text
//! fetch 1234 → forward → persist cursor 1234 → discard staging for 1234
//!              (crash here = re-forward 1234, staged file reused)
//! ```
//!
//! ## Corruption
//!
//! A missing, unreadable, unparsable or negative cursor file loads as `0`,
//! i.e. "start over". The remote source is the source of truth, so no
//! partial-write recovery is attempted; writes go to a sibling temp file and
//! are renamed over the cursor so a crash leaves either the old or the new
//! value.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Filename of the cursor inside a pair directory.
pub const CURSOR_FILE: &str = "offset.txt";

const CURSOR_TMP_FILE: &str = "offset.txt.tmp";

/// Persistent cursor for one replication pair.
#[derive(Debug, Clone)]
pub struct CursorStore {
    /// Directory holding the cursor file
    dir: PathBuf,
}

impl CursorStore {
    /// Cursor store rooted at `pair_dir`. Nothing is touched on disk.
    pub fn new(pair_dir: impl AsRef<Path>) -> Self {
        Self {
            dir: pair_dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the cursor file.
    pub fn path(&self) -> PathBuf {
        self.dir.join(CURSOR_FILE)
    }

    /// Load the cursor, or `0` for a first-time sync.
    ///
    /// Never fails: corruption is treated as "nothing replicated yet".
    pub async fn load(&self) -> i64 {
        let path = self.path();
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match raw.trim().parse::<i64>() {
                Ok(offset) if offset >= 0 => {
                    debug!(path = %path.display(), offset, "Loaded cursor from disk");
                    offset
                }
                _ => {
                    warn!(path = %path.display(), content = %raw.trim(), "Unparsable cursor, starting over");
                    0
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => 0,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to read cursor, starting over");
                0
            }
        }
    }

    /// Persist `offset`, returning it, or `0` if the write failed.
    ///
    /// Callers that must distinguish failure use [`try_persist`](Self::try_persist).
    pub async fn persist(&self, offset: i64) -> i64 {
        match self.try_persist(offset).await {
            Ok(()) => offset,
            Err(e) => {
                warn!(path = %self.path().display(), offset, error = %e, "Failed to persist cursor");
                0
            }
        }
    }

    /// Persist `offset` as a whole-file replacement.
    pub async fn try_persist(&self, offset: i64) -> std::io::Result<()> {
        let tmp = self.dir.join(CURSOR_TMP_FILE);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&tmp, offset.to_string()).await?;
        tokio::fs::rename(&tmp, self.path()).await?;
        debug!(path = %self.path().display(), offset, "Cursor persisted");
        Ok(())
    }
}
