// Copyright (c) 2025-2026 Adrian Robinson. Licensed under the AGPL-3.0.
// See LICENSE file in the project root for full license text.

//! Messages as delivered by the remote source.
//!
//! A [`RemoteMessage`] is read-only: the replicator never mutates it, it only
//! classifies it by [`MediaVariant`] and forwards what it carries.

use std::fmt;

/// Name used for a voice note that carries no filename attribute.
pub const VOICE_FILE_NAME: &str = "voice.oga";

/// Name used for a document that carries neither a filename nor a voice flag.
pub const UNTITLED_FILE_NAME: &str = "No title.oga";

/// One message from the source topic.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteMessage {
    /// Message id, strictly increasing within a chat.
    pub id: i64,
    /// Text body or media caption. Empty when absent.
    pub text: String,
    /// Attached media.
    pub media: MediaVariant,
    /// Chat the message lives in (for permalinks in logs).
    pub chat_id: i64,
    /// Service entries (joins, pins, topic creation) carry no content.
    pub is_service: bool,
}

impl RemoteMessage {
    /// Plain text message.
    pub fn text(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            media: MediaVariant::None,
            chat_id: 0,
            is_service: false,
        }
    }

    /// Message carrying `media` with `caption`.
    pub fn with_media(id: i64, caption: impl Into<String>, media: MediaVariant) -> Self {
        Self {
            id,
            text: caption.into(),
            media,
            chat_id: 0,
            is_service: false,
        }
    }

    /// Service entry.
    pub fn service(id: i64) -> Self {
        Self {
            id,
            text: String::new(),
            media: MediaVariant::None,
            chat_id: 0,
            is_service: true,
        }
    }

    /// Set the chat id.
    pub fn in_chat(mut self, chat_id: i64) -> Self {
        self.chat_id = chat_id;
        self
    }

    /// Permalink used in debug logs.
    pub fn permalink(&self) -> String {
        format!("https://t.me/c/{}/{}", self.chat_id, self.id)
    }
}

/// Media attached to a message. Closed set: every variant is matched
/// exhaustively by the forwarder.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaVariant {
    /// No media, text only.
    None,
    /// A file: audio, voice note, video, archive, anything.
    Document(Document),
    /// A compressed photo.
    Photo(Photo),
    /// A poll. Never forwarded.
    Poll,
    /// Media kinds the replicator does not understand (geo, contact, dice...).
    Other(String),
}

impl MediaVariant {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "text",
            Self::Document(_) => "document",
            Self::Photo(_) => "photo",
            Self::Poll => "poll",
            Self::Other(_) => "other",
        }
    }
}

/// A remote document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Remote document id.
    pub id: i64,
    /// Declared size in bytes. Used for the dedup check.
    pub size: u64,
    /// MIME type, if declared.
    pub mime_type: Option<String>,
    /// Attributes, propagated unchanged to the destination.
    pub attributes: Vec<DocumentAttribute>,
}

impl Document {
    /// Filename to stage the document under.
    pub fn file_name(&self) -> String {
        resolve_file_name(&self.attributes)
    }

    /// Whether the destination should present this as a voice note.
    pub fn is_voice(&self) -> bool {
        is_voice(&self.attributes)
    }
}

/// A remote photo.
#[derive(Debug, Clone, PartialEq)]
pub struct Photo {
    /// Remote photo id.
    pub id: i64,
}

/// Document attributes that matter for replication.
#[derive(Debug, Clone, PartialEq)]
pub enum DocumentAttribute {
    /// Original filename.
    Filename(String),
    /// Audio metadata.
    Audio {
        voice: bool,
        duration_secs: u32,
        title: Option<String>,
        performer: Option<String>,
    },
    /// Video metadata.
    Video {
        duration_secs: u32,
        width: u32,
        height: u32,
        round_message: bool,
    },
    /// Opaque attribute, kept only so it can be propagated.
    Other(String),
}

impl fmt::Display for DocumentAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filename(name) => write!(f, "filename={}", name),
            Self::Audio { voice, duration_secs, .. } => {
                write!(f, "audio(voice={}, {}s)", voice, duration_secs)
            }
            Self::Video { duration_secs, width, height, .. } => {
                write!(f, "video({}x{}, {}s)", width, height, duration_secs)
            }
            Self::Other(name) => write!(f, "{}", name),
        }
    }
}

/// Voice flag of the first audio attribute, `false` without one.
pub fn is_voice(attributes: &[DocumentAttribute]) -> bool {
    attributes
        .iter()
        .find_map(|attr| match attr {
            DocumentAttribute::Audio { voice, .. } => Some(*voice),
            _ => None,
        })
        .unwrap_or(false)
}

/// Filename from the first filename attribute, else [`VOICE_FILE_NAME`] for
/// voice notes, else [`UNTITLED_FILE_NAME`].
pub fn resolve_file_name(attributes: &[DocumentAttribute]) -> String {
    let named = attributes.iter().find_map(|attr| match attr {
        DocumentAttribute::Filename(name) => Some(name.clone()),
        _ => None,
    });

    match named {
        Some(name) => name,
        None if is_voice(attributes) => VOICE_FILE_NAME.to_string(),
        None => UNTITLED_FILE_NAME.to_string(),
    }
}
