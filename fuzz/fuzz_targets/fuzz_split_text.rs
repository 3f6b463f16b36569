//! Fuzz target for message body splitting.
//!
//! Splitting must never panic (char boundaries, tiny limits) and every
//! part must fit the limit.

#![no_main]

use libfuzzer_sys::fuzz_target;
use topic_replicator::splitter::{split_into_parts, split_text};

fuzz_target!(|data: (&str, u8)| {
    let (text, max) = data;
    let max = usize::from(max).max(1);

    let (head, tail) = split_text(text, max);
    assert!(head.chars().count() <= max);
    if let Some(tail) = tail {
        assert!(!tail.is_empty());
    }

    for part in split_into_parts(text, max) {
        assert!(!part.is_empty());
        assert!(part.chars().count() <= max);
    }
});
