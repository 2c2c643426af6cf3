//! Types for conversation management.

use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title given to a conversation created without a first message.
pub const NEW_CONVERSATION_TITLE: &str = "New Conversation";

/// Preview shown for a conversation that has no messages yet.
pub const EMPTY_PREVIEW: &str = "New conversation";

/// Maximum title length (characters) before truncation.
pub const TITLE_MAX_CHARS: usize = 40;

/// Maximum preview length (characters) before truncation.
pub const PREVIEW_MAX_CHARS: usize = 60;

const ELLIPSIS: &str = "...";
const CONVERSATION_ID_PREFIX: &str = "conv";
const ID_SUFFIX_LEN: usize = 9;

/// Author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Typed by the person using the chat.
    User,
    /// Produced by the language model (or a synthetic error reply).
    Assistant,
}

impl Role {
    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single chat message. Identity is `id`; content is never edited.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Opaque unique identifier.
    pub id: String,
    /// Who wrote the message.
    pub role: Role,
    /// Raw text. Assistant text may carry the renderer's markup subset.
    pub content: String,
    /// When the message was created, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a message stamped with the current time and a fresh id.
    #[must_use]
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: Some(Utc::now()),
        }
    }

    /// Shorthand for a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Shorthand for an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Whether the message was authored by the user.
    #[must_use]
    pub const fn is_user(&self) -> bool {
        matches!(self.role, Role::User)
    }
}

/// A conversation with its full, chronologically ordered message list.
///
/// Serialized with camelCase field names and RFC 3339 instants, which is the
/// layout of the persisted collection.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Unique identifier (`conv_<millis>_<suffix>`).
    pub id: String,
    /// Display title.
    pub title: String,
    /// Messages in insertion (chronological) order.
    pub messages: Vec<Message>,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant. Never earlier than `created_at`.
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    /// Create a conversation, optionally seeded with its first message.
    #[must_use]
    pub fn new(first_message: Option<Message>) -> Self {
        Self::new_at(first_message, Utc::now())
    }

    /// Create a conversation as of `now`.
    #[must_use]
    pub fn new_at(first_message: Option<Message>, now: DateTime<Utc>) -> Self {
        let title = first_message
            .as_ref()
            .map_or_else(|| NEW_CONVERSATION_TITLE.to_string(), |m| generate_title(&m.content));

        Self {
            id: generate_conversation_id(now),
            title,
            messages: first_message.into_iter().collect(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Append a message and bump `updated_at`.
    ///
    /// A conversation still carrying the placeholder title takes its title
    /// from the first message appended to it.
    pub fn push_message(&mut self, message: Message) {
        if self.messages.is_empty() && self.title == NEW_CONVERSATION_TITLE {
            self.title = generate_title(&message.content);
        }
        self.messages.push(message);
        self.updated_at = Utc::now().max(self.created_at);
    }

    /// Project the conversation into its sidebar summary.
    #[must_use]
    pub fn summary(&self) -> ConversationSummary {
        let preview = self.messages.first().map_or_else(
            || EMPTY_PREVIEW.to_string(),
            |m| truncate_with_ellipsis(&m.content, PREVIEW_MAX_CHARS),
        );

        ConversationSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            preview,
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Derived view of a conversation used for list display. Never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    /// Conversation id.
    pub id: String,
    /// Conversation title.
    pub title: String,
    /// Start of the first message.
    pub preview: String,
    /// Number of messages.
    pub message_count: usize,
    /// Creation instant.
    pub created_at: DateTime<Utc>,
    /// Last mutation instant.
    pub updated_at: DateTime<Utc>,
}

/// Derive a conversation title from the text of its first message.
///
/// Text of up to [`TITLE_MAX_CHARS`] characters (after trimming) is used
/// verbatim. Longer text is cut to that many characters, trailing whitespace
/// removed, and `...` appended.
#[must_use]
pub fn generate_title(source: &str) -> String {
    let cleaned = source.trim();
    match cleaned.char_indices().nth(TITLE_MAX_CHARS) {
        None => cleaned.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", cleaned[..cut].trim_end()),
    }
}

/// Build a conversation id from the creation instant and a random suffix.
#[must_use]
pub fn generate_conversation_id(now: DateTime<Utc>) -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!(
        "{CONVERSATION_ID_PREFIX}_{}_{suffix}",
        now.timestamp_millis()
    )
}

fn truncate_with_ellipsis(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    }
}
