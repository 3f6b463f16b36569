// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Message classification and forwarding.
//!
//! [`MessageForwarder::forward`] handles exactly one message:
//!
//! | Media | Behavior |
//! |-------|----------|
//! | document | ignore-pattern check, dedup against staged file, download, send with cleaned caption |
//! | photo | download (no dedup), send with cleaned caption |
//! | poll | skipped |
//! | none | text sent as-is |
//! | other | text sent as-is if present, media dropped; skipped otherwise |
//!
//! A send rejected as too long is split and re-sent here; it never reaches
//! the retry policy unless the parts themselves are rejected.

use crate::config::MessageFilters;
use crate::error::{RemoteError, ReplicationError, Result};
use crate::message::{Document, MediaVariant, RemoteMessage, UNTITLED_FILE_NAME};
use crate::remote::{FileUpload, RemotePlatform};
use crate::splitter::split_into_parts;
use crate::staging::{sanitize_file_name, StagingArea};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Filename photos are staged under.
pub const PHOTO_FILE_NAME: &str = "photo.jpg";

/// Result of handling one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForwardOutcome {
    /// Something was sent to the destination.
    Forwarded {
        /// Media kind label (`text`, `document`, `photo`, `other`).
        kind: &'static str,
        /// How the media artifact was obtained.
        media: MediaFetch,
        /// Number of text parts sent after a too-long rejection, 0 if none.
        split_parts: usize,
    },
    /// Nothing was sent; the cursor still advances past the message.
    Skipped(SkipReason),
}

/// How a media artifact was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaFetch {
    /// No media involved.
    NotNeeded,
    /// Downloaded from the platform (`bytes` as declared, 0 when unknown).
    Downloaded { bytes: u64 },
    /// A staged file of the declared size was reused.
    Reused,
}

/// Why a message was not forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Service entry (join, pin, ...).
    Service,
    /// Polls are not replicated.
    Poll,
    /// Document filename matched the ignore pattern.
    IgnoredFile(String),
    /// Unrecognized media and no text to fall back to.
    UnsupportedMedia,
    /// Text message with an empty body.
    EmptyText,
}

impl SkipReason {
    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Poll => "poll",
            Self::IgnoredFile(_) => "ignored_file",
            Self::UnsupportedMedia => "unsupported_media",
            Self::EmptyText => "empty_text",
        }
    }
}

/// Where forwarded messages go.
#[derive(Debug)]
pub struct Destination<'a, H> {
    pub handle: &'a H,
    pub topic_id: Option<i64>,
}

/// Classifies messages and sends them to a destination.
pub struct MessageForwarder<P: RemotePlatform> {
    platform: Arc<P>,
    filters: MessageFilters,
    max_message_length: usize,
}

impl<P: RemotePlatform> MessageForwarder<P> {
    pub fn new(platform: Arc<P>, filters: MessageFilters, max_message_length: usize) -> Self {
        Self {
            platform,
            filters,
            max_message_length,
        }
    }

    /// The platform this forwarder sends through.
    pub fn platform(&self) -> &Arc<P> {
        &self.platform
    }

    /// Handle one message, staging media under `staging`.
    pub async fn forward(
        &self,
        message: &RemoteMessage,
        dest: &Destination<'_, P::Handle>,
        staging: &StagingArea,
    ) -> Result<ForwardOutcome> {
        if message.is_service {
            debug!(message_id = message.id, "Skipping service message");
            return Ok(ForwardOutcome::Skipped(SkipReason::Service));
        }

        match &message.media {
            MediaVariant::Document(doc) => self.forward_document(message, doc, dest, staging).await,
            MediaVariant::Photo(_) => self.forward_photo(message, dest, staging).await,
            MediaVariant::Poll => {
                info!(message_id = message.id, "Skipping message with poll");
                Ok(ForwardOutcome::Skipped(SkipReason::Poll))
            }
            MediaVariant::None => {
                if message.text.is_empty() {
                    info!(message_id = message.id, "Skipping message with empty text");
                    return Ok(ForwardOutcome::Skipped(SkipReason::EmptyText));
                }
                let split_parts = self.send_text(dest, &message.text).await?;
                Ok(ForwardOutcome::Forwarded {
                    kind: "text",
                    media: MediaFetch::NotNeeded,
                    split_parts,
                })
            }
            MediaVariant::Other(kind) => {
                if message.text.is_empty() {
                    info!(message_id = message.id, media = %kind, "Skipping message (unknown media and no text)");
                    return Ok(ForwardOutcome::Skipped(SkipReason::UnsupportedMedia));
                }
                warn!(message_id = message.id, media = %kind, "Dropping unsupported media, sending text only");
                let split_parts = self.send_text(dest, &message.text).await?;
                Ok(ForwardOutcome::Forwarded {
                    kind: "other",
                    media: MediaFetch::NotNeeded,
                    split_parts,
                })
            }
        }
    }

    async fn forward_document(
        &self,
        message: &RemoteMessage,
        doc: &Document,
        dest: &Destination<'_, P::Handle>,
        staging: &StagingArea,
    ) -> Result<ForwardOutcome> {
        let file_name = doc.file_name();
        if self.filters.is_ignored(&file_name) {
            info!(message_id = message.id, file_name = %file_name, "Skipping message, file ignore pattern matches");
            return Ok(ForwardOutcome::Skipped(SkipReason::IgnoredFile(file_name)));
        }

        let dir = staging
            .prepare_message_dir(message.id)
            .await
            .map_err(|e| ReplicationError::staging(staging.message_dir(message.id), e))?;
        let path = dir.join(sanitize_file_name(&file_name, UNTITLED_FILE_NAME));

        let media = if staged_size(&path).await == Some(doc.size) {
            debug!(path = %path.display(), size = doc.size, "File already staged with matching size, skipping download");
            MediaFetch::Reused
        } else {
            debug!(message_id = message.id, file_name = %file_name, size = doc.size, "Downloading file");
            self.platform
                .download_media(&message.media, &path)
                .await
                .map_err(|e| ReplicationError::remote("download_media", e))?;
            MediaFetch::Downloaded { bytes: doc.size }
        };

        let caption = self.filters.clean(&message.text);
        debug!(message_id = message.id, path = %path.display(), "Sending message with attached file");
        let upload = FileUpload {
            path: &path,
            attributes: &doc.attributes,
            caption: &caption,
            voice_note: doc.is_voice(),
        };
        let split_parts = self.send_file(dest, upload).await?;

        Ok(ForwardOutcome::Forwarded {
            kind: "document",
            media,
            split_parts,
        })
    }

    async fn forward_photo(
        &self,
        message: &RemoteMessage,
        dest: &Destination<'_, P::Handle>,
        staging: &StagingArea,
    ) -> Result<ForwardOutcome> {
        let dir = staging
            .prepare_message_dir(message.id)
            .await
            .map_err(|e| ReplicationError::staging(staging.message_dir(message.id), e))?;
        let path = dir.join(PHOTO_FILE_NAME);

        self.platform
            .download_media(&message.media, &path)
            .await
            .map_err(|e| ReplicationError::remote("download_media", e))?;
        let bytes = staged_size(&path).await.unwrap_or(0);

        let caption = self.filters.clean(&message.text);
        debug!(message_id = message.id, "Sending message with attached photo");
        let upload = FileUpload {
            path: &path,
            attributes: &[],
            caption: &caption,
            voice_note: false,
        };
        let split_parts = self.send_file(dest, upload).await?;

        Ok(ForwardOutcome::Forwarded {
            kind: "photo",
            media: MediaFetch::Downloaded { bytes },
            split_parts,
        })
    }

    /// Send a file; on a too-long caption, send it bare followed by the
    /// caption as split text. Returns the number of text parts sent.
    async fn send_file(
        &self,
        dest: &Destination<'_, P::Handle>,
        upload: FileUpload<'_>,
    ) -> Result<usize> {
        match self.platform.send_file(dest.handle, dest.topic_id, upload).await {
            Ok(()) => Ok(0),
            Err(RemoteError::TooLong) => {
                info!(chars = upload.caption.chars().count(), "Caption too long, sending file bare and caption as text");
                self.platform
                    .send_file(dest.handle, dest.topic_id, upload.without_caption())
                    .await
                    .map_err(|e| ReplicationError::remote("send_file", e))?;
                self.send_parts(dest, upload.caption).await
            }
            Err(e) => Err(ReplicationError::remote("send_file", e)),
        }
    }

    /// Send text; on a too-long rejection, split and send the parts.
    /// Returns the number of parts sent after splitting, 0 if none.
    async fn send_text(&self, dest: &Destination<'_, P::Handle>, text: &str) -> Result<usize> {
        match self.platform.send_text(dest.handle, dest.topic_id, text).await {
            Ok(()) => Ok(0),
            Err(RemoteError::TooLong) => {
                info!(chars = text.chars().count(), "Message was too long, splitting");
                self.send_parts(dest, text).await
            }
            Err(e) => Err(ReplicationError::remote("send_text", e)),
        }
    }

    async fn send_parts(&self, dest: &Destination<'_, P::Handle>, text: &str) -> Result<usize> {
        let parts = split_into_parts(text, self.max_message_length);
        for part in &parts {
            self.platform
                .send_text(dest.handle, dest.topic_id, part)
                .await
                .map_err(|e| ReplicationError::remote("send_text", e))?;
        }
        Ok(parts.len())
    }
}

async fn staged_size(path: &Path) -> Option<u64> {
    tokio::fs::metadata(path)
        .await
        .ok()
        .filter(|meta| meta.is_file())
        .map(|meta| meta.len())
}
