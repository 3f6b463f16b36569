// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Shared test utilities for integration and chaos tests.
//!
//! This module provides:
//! - A recording, scriptable RemotePlatform mock
//! - Message constructors
//! - Engine and on-disk state helpers

#![allow(dead_code)]

pub mod mock_remote;

pub use mock_remote::*;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use topic_replicator::{
    Endpoint, MessageFilters, PatternConfig, ReplicationEngine, ReplicationPair,
    ReplicationSettings,
};

/// Source 100 topic 7 into destination 200 topic 9.
pub fn test_pair() -> ReplicationPair {
    ReplicationPair::new(Endpoint::new(100, Some(7)), Endpoint::new(200, Some(9)))
}

/// Engine over `pairs` with default settings and no filters.
pub fn engine(
    data_dir: &Path,
    platform: &Arc<MockPlatform>,
    pairs: Vec<ReplicationPair>,
) -> ReplicationEngine<MockPlatform> {
    engine_with(data_dir, platform, pairs, MessageFilters::default(), ReplicationSettings::default())
}

pub fn engine_with(
    data_dir: &Path,
    platform: &Arc<MockPlatform>,
    pairs: Vec<ReplicationPair>,
    filters: MessageFilters,
    settings: ReplicationSettings,
) -> ReplicationEngine<MockPlatform> {
    ReplicationEngine::new(pairs, filters, &settings, data_dir, Arc::clone(platform))
}

/// Compile filters from optional patterns.
pub fn filters(file_ignore: Option<&str>, message_cleanup: Option<&str>) -> MessageFilters {
    PatternConfig {
        file_ignore: file_ignore.map(str::to_string),
        message_cleanup: message_cleanup.map(str::to_string),
    }
    .compile()
    .unwrap()
}

/// Directory holding the cursor and staging for a pair.
pub fn pair_dir(data_dir: &Path, pair: &ReplicationPair) -> PathBuf {
    let topic = pair
        .source
        .topic_id
        .map(|t| t.to_string())
        .unwrap_or_else(|| "none".to_string());
    data_dir.join(pair.source.group_id.to_string()).join(topic)
}

pub fn staging_dir(data_dir: &Path, pair: &ReplicationPair) -> PathBuf {
    pair_dir(data_dir, pair).join("staging")
}

/// Cursor as stored on disk, `None` if the file is missing.
pub fn read_cursor(data_dir: &Path, pair: &ReplicationPair) -> Option<i64> {
    std::fs::read_to_string(pair_dir(data_dir, pair).join("offset.txt"))
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

pub fn write_cursor(data_dir: &Path, pair: &ReplicationPair, cursor: &str) {
    let dir = pair_dir(data_dir, pair);
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("offset.txt"), cursor).unwrap();
}

/// Entries currently under the pair's staging root.
pub fn staged_entries(data_dir: &Path, pair: &ReplicationPair) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(staging_dir(data_dir, pair))
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Pre-stage a file for message `id`, as a crashed earlier run would leave it.
pub fn stage_file(data_dir: &Path, pair: &ReplicationPair, id: i64, name: &str, bytes: usize) -> PathBuf {
    let dir = staging_dir(data_dir, pair).join(id.to_string());
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    std::fs::write(&path, vec![1u8; bytes]).unwrap();
    path
}
