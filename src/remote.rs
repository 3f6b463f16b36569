// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Remote messaging platform integration trait.
//!
//! The replicator never talks to the platform's wire protocol itself. The
//! embedding binary owns the connected, authenticated client and hands the
//! engine an implementation of [`RemotePlatform`]. Tests use a recording mock.
//!
//! # Example
//!
//! ```rust,no_run
//! use topic_replicator::remote::{BoxFuture, FileUpload, RemotePlatform};
//! use topic_replicator::message::{MediaVariant, RemoteMessage};
//! use std::path::Path;
//!
//! struct MyClient { /* ... */ }
//!
//! impl RemotePlatform for MyClient {
//!     type Handle = i64;
//!
//!     fn resolve_endpoint(&self, group_id: i64) -> BoxFuture<'_, i64> {
//!         Box::pin(async move { Ok(group_id) })
//!     }
//!
//!     fn fetch_messages<'a>(
//!         &'a self,
//!         _source: &'a i64,
//!         _after_id: i64,
//!         _topic_id: Option<i64>,
//!         _limit: usize,
//!     ) -> BoxFuture<'a, Vec<RemoteMessage>> {
//!         Box::pin(async move { Ok(Vec::new()) })
//!     }
//!
//!     fn download_media<'a>(&'a self, _media: &'a MediaVariant, _dest: &'a Path) -> BoxFuture<'a, ()> {
//!         Box::pin(async move { Ok(()) })
//!     }
//!
//!     fn send_text<'a>(&'a self, _dest: &'a i64, _topic: Option<i64>, _text: &'a str) -> BoxFuture<'a, ()> {
//!         Box::pin(async move { Ok(()) })
//!     }
//!
//!     fn send_file<'a>(&'a self, _dest: &'a i64, _topic: Option<i64>, _file: FileUpload<'a>) -> BoxFuture<'a, ()> {
//!         Box::pin(async move { Ok(()) })
//!     }
//! }
//! ```

use crate::error::RemoteError;
use crate::message::{DocumentAttribute, MediaVariant, RemoteMessage};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;

/// Result type for platform operations.
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Type alias for boxed async futures (reduces trait signature complexity).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = RemoteResult<T>> + Send + 'a>>;

/// A staged file to upload to the destination.
#[derive(Debug, Clone, Copy)]
pub struct FileUpload<'a> {
    /// Local path of the staged artifact.
    pub path: &'a Path,
    /// Attributes of the original document (empty for photos).
    pub attributes: &'a [DocumentAttribute],
    /// Cleaned caption, possibly empty.
    pub caption: &'a str,
    /// Present the file as a voice note.
    pub voice_note: bool,
}

impl<'a> FileUpload<'a> {
    /// Same upload without a caption.
    pub fn without_caption(self) -> Self {
        Self { caption: "", ..self }
    }
}

/// What the replicator needs from the messaging platform.
///
/// Every method may fail with [`RemoteError::RateLimited`]. The engine
/// awaits calls strictly one at a time, so implementations never see
/// concurrent use.
pub trait RemotePlatform: Send + Sync + 'static {
    /// Resolved chat handle (input peer, access hash, ...).
    type Handle: Clone + fmt::Debug + Send + Sync;

    /// Resolve a group id into a handle usable for fetching and sending.
    fn resolve_endpoint(&self, group_id: i64) -> BoxFuture<'_, Self::Handle>;

    /// Messages with id strictly greater than `after_id`, ascending, at most
    /// `limit` of them, restricted to `topic_id` when given.
    fn fetch_messages<'a>(
        &'a self,
        source: &'a Self::Handle,
        after_id: i64,
        topic_id: Option<i64>,
        limit: usize,
    ) -> BoxFuture<'a, Vec<RemoteMessage>>;

    /// Download `media` to `destination`.
    ///
    /// Fails with [`RemoteError::ExpiredReference`] when the file reference
    /// listed with the message has gone stale.
    fn download_media<'a>(
        &'a self,
        media: &'a MediaVariant,
        destination: &'a Path,
    ) -> BoxFuture<'a, ()>;

    /// Send a text message.
    ///
    /// Fails with [`RemoteError::TooLong`] if `text` exceeds the platform
    /// limit.
    fn send_text<'a>(
        &'a self,
        destination: &'a Self::Handle,
        topic_id: Option<i64>,
        text: &'a str,
    ) -> BoxFuture<'a, ()>;

    /// Send a staged file with an optional caption.
    ///
    /// Fails with [`RemoteError::TooLong`] if the caption exceeds the
    /// platform limit.
    fn send_file<'a>(
        &'a self,
        destination: &'a Self::Handle,
        topic_id: Option<i64>,
        file: FileUpload<'a>,
    ) -> BoxFuture<'a, ()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_without_caption_keeps_file() {
        let attrs = vec![DocumentAttribute::Filename("a.mp3".into())];
        let upload = FileUpload {
            path: Path::new("/tmp/a.mp3"),
            attributes: &attrs,
            caption: "hello",
            voice_note: true,
        };
        let bare = upload.without_caption();
        assert_eq!(bare.caption, "");
        assert_eq!(bare.path, Path::new("/tmp/a.mp3"));
        assert_eq!(bare.attributes.len(), 1);
        assert!(bare.voice_note);
    }
}
