// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Configuration for the topic replicator.
//!
//! Configuration can be constructed programmatically, deserialized from
//! YAML/JSON, or read from the process environment with
//! [`ReplicatorConfig::from_env`].
//!
//! # Configuration Structure
//!
//! ```text
//! ReplicatorConfig
//! ├── links: LinkConfig            # ordered source/destination links
//! ├── patterns: PatternConfig      # filename-ignore and caption-cleanup regexes
//! ├── settings: ReplicationSettings
//! ├── storage: StorageConfig       # cursor files and staging
//! └── credentials: Option<Credentials>  # passed through to the platform client
//! ```
//!
//! # Environment
//!
//! | Variable | Field |
//! |----------|-------|
//! | `FROM`, `TO` | `links.from`, `links.to` (comma-separated) |
//! | `FILE_IGNORE_PATTERN` | `patterns.file_ignore` |
//! | `MESSAGE_CLEANUP_PATTERN` | `patterns.message_cleanup` |
//! | `API_ID`, `API_HASH` | `credentials` |
//! | `REPLICATOR_DATA_DIR` | `storage.data_dir` |
//! | `REPLICATOR_BATCH_LIMIT` | `settings.batch_limit` |

use crate::error::{ReplicationError, Result};
use crate::links::{load_pairs, split_link_list, ReplicationPair};
use crate::resilience::RetryPolicy;
use crate::splitter::DEFAULT_MAX_LENGTH;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::PathBuf;
use std::time::Duration;

/// Upper bound on messages fetched per pass.
pub const MAX_BATCH_LIMIT: usize = 50;

// ═══════════════════════════════════════════════════════════════════════════════
// Top-level config
// ═══════════════════════════════════════════════════════════════════════════════

/// The top-level config object.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReplicatorConfig {
    /// Source and destination links, paired by position.
    pub links: LinkConfig,

    /// Regular expressions applied to every message.
    #[serde(default)]
    pub patterns: PatternConfig,

    /// Tunables for the fetch loop and backoff.
    #[serde(default)]
    pub settings: ReplicationSettings,

    /// Where cursors and staged media live.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Platform credentials. Not used by the engine itself.
    #[serde(default)]
    pub credentials: Option<Credentials>,
}

impl ReplicatorConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through `lookup` (an environment stand-in).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let links = LinkConfig {
            from: split_link_list(&lookup("FROM").unwrap_or_default()),
            to: split_link_list(&lookup("TO").unwrap_or_default()),
        };

        let patterns = PatternConfig {
            file_ignore: non_empty("FILE_IGNORE_PATTERN"),
            message_cleanup: non_empty("MESSAGE_CLEANUP_PATTERN"),
        };

        let mut settings = ReplicationSettings::default();
        if let Some(raw) = non_empty("REPLICATOR_BATCH_LIMIT") {
            settings.batch_limit = raw.trim().parse().map_err(|e| {
                ReplicationError::Config(format!("REPLICATOR_BATCH_LIMIT={:?}: {}", raw, e))
            })?;
        }

        let storage = match non_empty("REPLICATOR_DATA_DIR") {
            Some(data_dir) => StorageConfig { data_dir },
            None => StorageConfig::default(),
        };

        let credentials = match (non_empty("API_ID"), non_empty("API_HASH")) {
            (Some(id), Some(api_hash)) => Some(Credentials {
                api_id: id.trim().parse().map_err(|e| {
                    ReplicationError::Config(format!("API_ID={:?}: {}", id, e))
                })?,
                api_hash,
            }),
            (None, None) => None,
            _ => {
                return Err(ReplicationError::Config(
                    "API_ID and API_HASH must be set together".to_string(),
                ))
            }
        };

        Ok(Self {
            links,
            patterns,
            settings,
            storage,
            credentials,
        })
    }

    /// Create a minimal config for testing.
    pub fn for_testing(data_dir: impl Into<String>) -> Self {
        Self {
            storage: StorageConfig {
                data_dir: data_dir.into(),
            },
            ..Default::default()
        }
    }

    /// Parse the configured links into pairs.
    pub fn pairs(&self) -> Result<Vec<ReplicationPair>> {
        load_pairs(&self.links.from, &self.links.to)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LinkConfig
// ═══════════════════════════════════════════════════════════════════════════════

/// Source and destination links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default)]
    pub from: Vec<String>,
    #[serde(default)]
    pub to: Vec<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// PatternConfig / MessageFilters
// ═══════════════════════════════════════════════════════════════════════════════

/// Uncompiled regex patterns. Matching is case-insensitive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Documents whose filename matches are dropped without download.
    #[serde(default)]
    pub file_ignore: Option<String>,

    /// Matches are removed from captions before sending.
    #[serde(default)]
    pub message_cleanup: Option<String>,
}

impl PatternConfig {
    /// Compile both patterns.
    pub fn compile(&self) -> Result<MessageFilters> {
        Ok(MessageFilters {
            file_ignore: compile_pattern("file_ignore", self.file_ignore.as_deref())?,
            message_cleanup: compile_pattern("message_cleanup", self.message_cleanup.as_deref())?,
        })
    }
}

fn compile_pattern(name: &str, pattern: Option<&str>) -> Result<Option<Regex>> {
    pattern
        .filter(|p| !p.is_empty())
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|e| ReplicationError::Config(format!("invalid {} pattern: {}", name, e)))
        })
        .transpose()
}

/// Compiled, immutable filters shared by the forwarder.
#[derive(Debug, Clone, Default)]
pub struct MessageFilters {
    file_ignore: Option<Regex>,
    message_cleanup: Option<Regex>,
}

impl MessageFilters {
    /// Whether a document with `file_name` should be dropped.
    pub fn is_ignored(&self, file_name: &str) -> bool {
        self.file_ignore
            .as_ref()
            .is_some_and(|re| re.is_match(file_name))
    }

    /// Remove every cleanup-pattern match from `text`.
    pub fn clean<'t>(&self, text: &'t str) -> Cow<'t, str> {
        match &self.message_cleanup {
            Some(re) => re.replace_all(text, ""),
            None => Cow::Borrowed(text),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ReplicationSettings
// ═══════════════════════════════════════════════════════════════════════════════

/// Tunables for the fetch loop and backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationSettings {
    /// Messages fetched per pass. Clamped to `1..=50`.
    #[serde(default = "default_batch_limit")]
    pub batch_limit: usize,

    /// Longest text body sent in one message (characters).
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Seconds added to the platform's flood-wait hint.
    #[serde(default = "default_flood_wait_padding_sec")]
    pub flood_wait_padding_sec: u64,

    /// Wait used when flood control carries no hint, e.g. "100s".
    #[serde(default = "default_flood_fallback_wait")]
    pub flood_fallback_wait: String,
}

fn default_batch_limit() -> usize {
    MAX_BATCH_LIMIT
}

fn default_max_message_length() -> usize {
    DEFAULT_MAX_LENGTH
}

fn default_flood_wait_padding_sec() -> u64 {
    1
}

fn default_flood_fallback_wait() -> String {
    "100s".to_string()
}

impl Default for ReplicationSettings {
    fn default() -> Self {
        Self {
            batch_limit: MAX_BATCH_LIMIT,
            max_message_length: DEFAULT_MAX_LENGTH,
            flood_wait_padding_sec: 1,
            flood_fallback_wait: "100s".to_string(),
        }
    }
}

impl ReplicationSettings {
    /// Batch limit clamped to `1..=MAX_BATCH_LIMIT`.
    pub fn effective_batch_limit(&self) -> usize {
        self.batch_limit.clamp(1, MAX_BATCH_LIMIT)
    }

    /// Parse the fallback wait, defaulting to 100 seconds.
    pub fn flood_fallback_duration(&self) -> Duration {
        humantime::parse_duration(&self.flood_fallback_wait).unwrap_or(Duration::from_secs(100))
    }

    /// Retry policy built from these settings.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            flood_padding: Duration::from_secs(self.flood_wait_padding_sec),
            flood_fallback: self.flood_fallback_duration(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// StorageConfig / Credentials
// ═══════════════════════════════════════════════════════════════════════════════

/// Where cursor files and staged media live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Root directory; one subdirectory per source endpoint.
    pub data_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data/downloads".to_string(),
        }
    }
}

impl StorageConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }
}

/// Platform API credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_id: i32,
    pub api_hash: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════════════════════════
