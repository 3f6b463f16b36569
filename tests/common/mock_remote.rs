// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Mock RemotePlatform for testing.
//!
//! Serves scripted messages per source group, records every successful call
//! for assertions, and can be scripted to fail specific operations.
//! Downloads write a file of the declared document size so the dedup check
//! sees realistic artifacts.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use topic_replicator::message::{Document, DocumentAttribute, MediaVariant, Photo, RemoteMessage};
use topic_replicator::remote::{BoxFuture, FileUpload, RemotePlatform};
use topic_replicator::RemoteError;

/// Size of the file written when a photo is downloaded.
pub const PHOTO_BYTES: usize = 2048;

/// Platform operations that can be scripted to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    Resolve,
    Fetch,
    Download,
    SendText,
    SendFile,
}

/// A recorded successful call.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Resolve {
        group_id: i64,
    },
    Fetch {
        source: i64,
        after_id: i64,
        topic_id: Option<i64>,
        limit: usize,
    },
    Download {
        kind: &'static str,
        path: PathBuf,
    },
    SendText {
        destination: i64,
        topic_id: Option<i64>,
        text: String,
    },
    SendFile {
        destination: i64,
        topic_id: Option<i64>,
        path: PathBuf,
        caption: String,
        voice_note: bool,
        attributes: usize,
    },
}

#[derive(Default)]
struct State {
    messages: HashMap<i64, Vec<RemoteMessage>>,
    calls: Vec<Call>,
    attempts: HashMap<Op, usize>,
    fail_next: HashMap<Op, VecDeque<RemoteError>>,
    fail_at: HashMap<(Op, usize), RemoteError>,
    fail_text_containing: Vec<(String, RemoteError)>,
}

/// Mock implementation of RemotePlatform that records all calls.
///
/// # Example
/// ```rust,ignore
/// let mock = MockPlatform::new();
/// mock.add_messages(100, vec![RemoteMessage::text(1, "hi")]);
/// mock.fail_next(Op::SendText, RemoteError::flood(3));
///
/// // Run the engine...
///
/// assert_eq!(mock.sent_texts(), vec!["hi"]);
/// ```
#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<State>,
    /// Longest text or caption accepted, in characters.
    text_limit: Option<usize>,
    /// Ignore `after_id` and always return the full history.
    ignores_cursor: bool,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject texts and captions longer than `limit` characters.
    pub fn with_text_limit(mut self, limit: usize) -> Self {
        self.text_limit = Some(limit);
        self
    }

    /// Return every message on every fetch, like a source that ignores
    /// the offset it is given.
    pub fn ignoring_cursor(mut self) -> Self {
        self.ignores_cursor = true;
        self
    }

    /// Append messages to the history of `source_group`.
    pub fn add_messages(&self, source_group: i64, messages: Vec<RemoteMessage>) {
        let mut state = self.state.lock().unwrap();
        let history = state.messages.entry(source_group).or_default();
        history.extend(messages);
        history.sort_by_key(|m| m.id);
    }

    /// Fail the next call to `op` with `err`. Queued errors are consumed in order.
    pub fn fail_next(&self, op: Op, err: RemoteError) {
        let mut state = self.state.lock().unwrap();
        state.fail_next.entry(op).or_default().push_back(err);
    }

    /// Fail the `nth` call (1-based, failed calls included) to `op` with `err`.
    pub fn fail_call(&self, op: Op, nth: usize, err: RemoteError) {
        let mut state = self.state.lock().unwrap();
        state.fail_at.insert((op, nth), err);
    }

    /// Fail every text send whose body contains `needle`.
    pub fn fail_text_containing(&self, needle: &str, err: RemoteError) {
        let mut state = self.state.lock().unwrap();
        state.fail_text_containing.push((needle.to_string(), err));
    }

    // =========================================================================
    // Assertions
    // =========================================================================

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls to `op`, failed ones included.
    pub fn attempts(&self, op: Op) -> usize {
        self.state.lock().unwrap().attempts.get(&op).copied().unwrap_or(0)
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::SendText { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn sent_files(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SendFile { .. }))
            .collect()
    }

    pub fn downloads(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Download { .. }))
            .collect()
    }

    pub fn fetches(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Fetch { .. }))
            .collect()
    }

    /// All sends (text and file), in order.
    pub fn sends(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::SendText { .. } | Call::SendFile { .. }))
            .collect()
    }

    // =========================================================================
    // Internals
    // =========================================================================

    fn begin(&self, op: Op) -> Result<(), RemoteError> {
        let mut state = self.state.lock().unwrap();
        let attempt = {
            let count = state.attempts.entry(op).or_default();
            *count += 1;
            *count
        };
        if let Some(err) = state.fail_at.remove(&(op, attempt)) {
            return Err(err);
        }
        match state.fail_next.get_mut(&op).and_then(|q| q.pop_front()) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn record(&self, call: Call) {
        self.state.lock().unwrap().calls.push(call);
    }

    fn check_length(&self, text: &str) -> Result<(), RemoteError> {
        match self.text_limit {
            Some(limit) if text.chars().count() > limit => Err(RemoteError::TooLong),
            _ => Ok(()),
        }
    }
}

impl RemotePlatform for MockPlatform {
    type Handle = i64;

    fn resolve_endpoint(&self, group_id: i64) -> BoxFuture<'_, i64> {
        Box::pin(async move {
            self.begin(Op::Resolve)?;
            self.record(Call::Resolve { group_id });
            Ok(group_id)
        })
    }

    fn fetch_messages<'a>(
        &'a self,
        source: &'a i64,
        after_id: i64,
        topic_id: Option<i64>,
        limit: usize,
    ) -> BoxFuture<'a, Vec<RemoteMessage>> {
        Box::pin(async move {
            self.begin(Op::Fetch)?;
            self.record(Call::Fetch {
                source: *source,
                after_id,
                topic_id,
                limit,
            });
            let state = self.state.lock().unwrap();
            let history = state.messages.get(source).cloned().unwrap_or_default();
            Ok(history
                .into_iter()
                .filter(|m| self.ignores_cursor || m.id > after_id)
                .take(limit)
                .collect())
        })
    }

    fn download_media<'a>(
        &'a self,
        media: &'a MediaVariant,
        destination: &'a Path,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.begin(Op::Download)?;
            let bytes = match media {
                MediaVariant::Document(doc) => doc.size as usize,
                MediaVariant::Photo(_) => PHOTO_BYTES,
                other => return Err(RemoteError::Other(format!("cannot download {}", other.kind()))),
            };
            tokio::fs::write(destination, vec![0u8; bytes])
                .await
                .map_err(|e| RemoteError::Other(e.to_string()))?;
            self.record(Call::Download {
                kind: media.kind(),
                path: destination.to_path_buf(),
            });
            Ok(())
        })
    }

    fn send_text<'a>(
        &'a self,
        destination: &'a i64,
        topic_id: Option<i64>,
        text: &'a str,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.begin(Op::SendText)?;
            {
                let state = self.state.lock().unwrap();
                if let Some((_, err)) = state
                    .fail_text_containing
                    .iter()
                    .find(|(needle, _)| text.contains(needle.as_str()))
                {
                    return Err(err.clone());
                }
            }
            self.check_length(text)?;
            self.record(Call::SendText {
                destination: *destination,
                topic_id,
                text: text.to_string(),
            });
            Ok(())
        })
    }

    fn send_file<'a>(
        &'a self,
        destination: &'a i64,
        topic_id: Option<i64>,
        file: FileUpload<'a>,
    ) -> BoxFuture<'a, ()> {
        Box::pin(async move {
            self.begin(Op::SendFile)?;
            self.check_length(file.caption)?;
            if !file.path.is_file() {
                return Err(RemoteError::Other(format!("missing upload {}", file.path.display())));
            }
            self.record(Call::SendFile {
                destination: *destination,
                topic_id,
                path: file.path.to_path_buf(),
                caption: file.caption.to_string(),
                voice_note: file.voice_note,
                attributes: file.attributes.len(),
            });
            Ok(())
        })
    }
}

// =============================================================================
// Message helpers
// =============================================================================

/// Document message with a filename attribute.
pub fn document(id: i64, file_name: &str, size: u64, caption: &str) -> RemoteMessage {
    RemoteMessage::with_media(
        id,
        caption,
        MediaVariant::Document(Document {
            id: id * 1000,
            size,
            mime_type: None,
            attributes: vec![DocumentAttribute::Filename(file_name.to_string())],
        }),
    )
}

/// Voice note without a filename attribute.
pub fn voice_note(id: i64, size: u64) -> RemoteMessage {
    RemoteMessage::with_media(
        id,
        "",
        MediaVariant::Document(Document {
            id: id * 1000,
            size,
            mime_type: Some("audio/ogg".to_string()),
            attributes: vec![DocumentAttribute::Audio {
                voice: true,
                duration_secs: 3,
                title: None,
                performer: None,
            }],
        }),
    )
}

/// Photo message.
pub fn photo(id: i64, caption: &str) -> RemoteMessage {
    RemoteMessage::with_media(id, caption, MediaVariant::Photo(Photo { id: id * 1000 }))
}
