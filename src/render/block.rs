//! Typed block and inline-span tree produced by the message renderer.

use serde::Serialize;

/// A styled run of text inside a block. Spans never nest.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "style", content = "text", rename_all = "lowercase")]
pub enum Span {
    /// Unstyled text, markers included when they did not pair up.
    Text(String),
    /// `**text**` or `__text__`.
    Bold(String),
    /// `*text*` or `_text_`.
    Italic(String),
    /// `` `text` ``.
    Code(String),
}

impl Span {
    /// Text carried by the span, without markers.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Text(t) | Self::Bold(t) | Self::Italic(t) | Self::Code(t) => t,
        }
    }
}

/// A sequence of inline spans forming one block payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct InlineText(pub Vec<Span>);

impl InlineText {
    /// Wrap a single unstyled string.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self(vec![Span::Text(text.into())])
    }

    /// The spans in order.
    #[must_use]
    pub fn spans(&self) -> &[Span] {
        &self.0
    }

    /// Concatenated text of all spans, markers stripped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        self.0.iter().map(Span::text).collect()
    }

    /// Whether no span carries styling.
    #[must_use]
    pub fn is_unstyled(&self) -> bool {
        self.0.iter().all(|s| matches!(s, Span::Text(_)))
    }
}

/// A top-level renderable unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    /// Section header (`**Title:**`).
    Header {
        /// Header text with the enclosing markers removed.
        text: InlineText,
    },
    /// Consecutive bullet lines.
    List {
        /// One entry per bullet, marker removed.
        items: Vec<InlineText>,
    },
    /// Any other non-blank line.
    Paragraph {
        /// Trimmed line text.
        text: InlineText,
    },
    /// Vertical space standing in for blank lines.
    Spacer,
}
