// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Source/destination link parsing.
//!
//! Turns chat links into [`Endpoint`]s and zips the configured source and
//! destination lists into [`ReplicationPair`]s. Accepted shapes:
//!
//! ```text
//! https://t.me/c/2032328913223431                      group only
//! https://t.me/c/178231237449432/35664                 group + topic
//! https://web.telegram.org/a/#-1002488363646           group only
//! https://web.telegram.org/a/#-1002488312_17645660     group + topic
//! ```

use crate::error::{ReplicationError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const LINK_PATTERN: &str = r"(-?\d+)(?:[/_](-?\d+))?";

fn link_regex() -> Result<&'static Regex> {
    static LINK: OnceLock<std::result::Result<Regex, regex::Error>> = OnceLock::new();
    LINK.get_or_init(|| Regex::new(LINK_PATTERN))
        .as_ref()
        .map_err(|e| ReplicationError::Config(format!("link pattern: {}", e)))
}

/// A chat and, optionally, a topic inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub group_id: i64,
    pub topic_id: Option<i64>,
}

impl Endpoint {
    pub fn new(group_id: i64, topic_id: Option<i64>) -> Self {
        Self { group_id, topic_id }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.topic_id {
            Some(topic) => write!(f, "{}/{}", self.group_id, topic),
            None => write!(f, "{}", self.group_id),
        }
    }
}

/// Replicate everything in `source` into `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationPair {
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl ReplicationPair {
    pub fn new(source: Endpoint, destination: Endpoint) -> Self {
        Self { source, destination }
    }
}

impl fmt::Display for ReplicationPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

/// Parse one link into an [`Endpoint`].
pub fn parse_link(link: &str) -> Result<Endpoint> {
    let cleaned = link.trim().trim_end_matches('/');

    let caps = link_regex()?
        .captures(cleaned)
        .ok_or_else(|| ReplicationError::InvalidLink(format!("no chat id in {:?}", cleaned)))?;

    let parse_id = |raw: &str| {
        raw.parse::<i64>()
            .map_err(|e| ReplicationError::InvalidLink(format!("{:?} in {:?}: {}", raw, cleaned, e)))
    };

    let group_id = parse_id(&caps[1])?;
    let topic_id = caps.get(2).map(|m| parse_id(m.as_str())).transpose()?;

    Ok(Endpoint { group_id, topic_id })
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn split_link_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Zip source and destination links into pairs, in order.
///
/// Both lists must be non-empty and the same length.
pub fn load_pairs(from: &[String], to: &[String]) -> Result<Vec<ReplicationPair>> {
    if from.is_empty() || from.len() != to.len() {
        return Err(ReplicationError::InvalidLink(format!(
            "number of links doesn't match: 'from' has {} links, 'to' has {} links",
            from.len(),
            to.len()
        )));
    }

    from.iter()
        .zip(to)
        .map(|(src, dst)| Ok(ReplicationPair::new(parse_link(src)?, parse_link(dst)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_pattern_compiles() {
        assert!(link_regex().is_ok());
    }

    #[test]
    fn test_parse_group_only() {
        let ep = parse_link("https://t.me/c/2032328913223431").unwrap();
        assert_eq!(ep, Endpoint::new(2032328913223431, None));
    }

    #[test]
    fn test_parse_group_and_topic() {
        let ep = parse_link("https://t.me/c/178231237449432/35664").unwrap();
        assert_eq!(ep, Endpoint::new(178231237449432, Some(35664)));
    }

    #[test]
    fn test_parse_web_link_with_negative_id() {
        let ep = parse_link("https://web.telegram.org/a/#-1002488363646").unwrap();
        assert_eq!(ep, Endpoint::new(-1002488363646, None));

        let ep = parse_link("https://web.telegram.org/a/#-1002488312_17645660").unwrap();
        assert_eq!(ep, Endpoint::new(-1002488312, Some(17645660)));
    }

    #[test]
    fn test_parse_trims_whitespace_and_trailing_slash() {
        let ep = parse_link("  https://t.me/c/123/45/  ").unwrap();
        assert_eq!(ep, Endpoint::new(123, Some(45)));
    }

    #[test]
    fn test_parse_rejects_link_without_digits() {
        let err = parse_link("https://t.me/c/abc").unwrap_err();
        assert!(matches!(err, ReplicationError::InvalidLink(_)));
    }

    #[test]
    fn test_parse_rejects_overflowing_id() {
        let err = parse_link("https://t.me/c/99999999999999999999999").unwrap_err();
        assert!(matches!(err, ReplicationError::InvalidLink(_)));
    }

    #[test]
    fn test_split_link_list() {
        assert_eq!(split_link_list(" a, b,,c ,"), vec!["a", "b", "c"]);
        assert!(split_link_list("").is_empty());
        assert!(split_link_list(" , ").is_empty());
    }

    #[test]
    fn test_load_pairs_in_order() {
        let from = split_link_list("https://t.me/c/1/10, https://t.me/c/2");
        let to = split_link_list("https://t.me/c/3/30, https://t.me/c/4/40");
        let pairs = load_pairs(&from, &to).unwrap();

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].to_string(), "1/10 -> 3/30");
        assert_eq!(pairs[1].to_string(), "2 -> 4/40");
    }

    #[test]
    fn test_load_pairs_count_mismatch() {
        let from = split_link_list("https://t.me/c/1, https://t.me/c/2");
        let to = split_link_list("https://t.me/c/3");
        let err = load_pairs(&from, &to).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("'from' has 2"));
        assert!(msg.contains("'to' has 1"));
    }

    #[test]
    fn test_load_pairs_empty() {
        assert!(load_pairs(&[], &[]).is_err());
    }
}
