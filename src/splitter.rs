// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Splitting of message bodies that exceed the send limit.
//!
//! Lengths are counted in characters, not bytes. The cut prefers the last
//! paragraph break (`"\n\n"`) that ends at or before the limit.

/// Default send limit, in characters.
pub const DEFAULT_MAX_LENGTH: usize = 4000;

const PARAGRAPH_BREAK: &str = "\n\n";

/// Split `text` into a head of at most `max_length` characters and the rest.
///
/// Text that already fits is returned unchanged with no second part. Both
/// parts are trimmed; a second part that trims to nothing is `None`.
pub fn split_text(text: &str, max_length: usize) -> (String, Option<String>) {
    let limit = match text.char_indices().nth(max_length) {
        Some((byte_idx, _)) => byte_idx,
        None => return (text.to_string(), None),
    };

    let (head, tail) = match text[..limit].rfind(PARAGRAPH_BREAK) {
        Some(idx) => (&text[..idx], &text[idx + PARAGRAPH_BREAK.len()..]),
        None => (&text[..limit], &text[limit..]),
    };

    let tail = tail.trim();
    let tail = (!tail.is_empty()).then(|| tail.to_string());

    (head.trim().to_string(), tail)
}

/// Split `text` into as many parts as needed so each fits in `max_length`.
///
/// Up to twice the limit this yields exactly the two parts of
/// [`split_text`]. Empty parts are dropped.
pub fn split_into_parts(text: &str, max_length: usize) -> Vec<String> {
    let max_length = max_length.max(1);
    let mut parts = Vec::new();
    let mut rest = text.to_string();

    loop {
        let (head, tail) = split_text(&rest, max_length);
        if !head.is_empty() {
            parts.push(head);
        }
        match tail {
            Some(tail) => rest = tail,
            None => return parts,
        }
    }
}
