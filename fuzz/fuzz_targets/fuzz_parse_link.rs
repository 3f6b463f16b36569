//! Fuzz target for link parsing.
//!
//! Arbitrary input must never panic, and anything that parses must survive
//! a round trip through its display form.

#![no_main]

use libfuzzer_sys::fuzz_target;
use topic_replicator::links::{parse_link, split_link_list};

fuzz_target!(|data: &str| {
    if let Ok(endpoint) = parse_link(data) {
        let again = parse_link(&endpoint.to_string()).expect("display form parses");
        assert_eq!(again, endpoint);
    }

    for entry in split_link_list(data) {
        let _ = parse_link(&entry);
    }
});
