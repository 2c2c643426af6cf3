//! Terminal presentation of rendered blocks.
//!
//! Control characters are dropped from every text payload so message content
//! cannot smuggle escape sequences into the terminal.

use crossterm::style::{Attribute, Attributes, Color, ContentStyle};

use crate::conversations::Message;

use super::MessageRenderer;
use super::block::{Block, InlineText, Span};

const BULLET: &str = "  • ";

fn style(foreground: Option<Color>, attributes: Attributes) -> ContentStyle {
    ContentStyle {
        foreground_color: foreground,
        attributes,
        ..ContentStyle::default()
    }
}

fn header_style() -> ContentStyle {
    style(Some(Color::Cyan), Attributes::from(Attribute::Bold) | Attribute::Underlined)
}

fn span_style(span: &Span) -> Option<ContentStyle> {
    match span {
        Span::Text(_) => None,
        Span::Bold(_) => Some(style(None, Attribute::Bold.into())),
        Span::Italic(_) => Some(style(None, Attribute::Italic.into())),
        Span::Code(_) => Some(style(Some(Color::Yellow), Attributes::default())),
    }
}

/// Render blocks as terminal text, with ANSI styling when `ansi` is set.
#[must_use]
pub fn blocks_to_terminal(blocks: &[Block], ansi: bool) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Header { text } => {
                let clean = sanitize(&text.plain_text());
                if ansi {
                    out.push_str(&header_style().apply(clean).to_string());
                } else {
                    out.push_str(&clean);
                }
                out.push('\n');
            }
            Block::List { items } => {
                for item in items {
                    out.push_str(BULLET);
                    push_inline(&mut out, item, ansi);
                    out.push('\n');
                }
            }
            Block::Paragraph { text } => {
                push_inline(&mut out, text, ansi);
                out.push('\n');
            }
            Block::Spacer => out.push('\n'),
        }
    }
    out
}

/// Render a stored message: assistant text through the renderer, user text verbatim.
#[must_use]
pub fn message_to_terminal(renderer: &MessageRenderer, message: &Message, ansi: bool) -> String {
    if message.is_user() {
        let mut out = sanitize(&message.content);
        out.push('\n');
        out
    } else {
        blocks_to_terminal(&renderer.render(&message.content), ansi)
    }
}

/// Drop control characters other than newline and tab.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
        .collect()
}

fn push_inline(out: &mut String, text: &InlineText, ansi: bool) {
    for span in text.spans() {
        let clean = sanitize(span.text());
        match span_style(span) {
            Some(span_style) if ansi => out.push_str(&span_style.apply(clean).to_string()),
            _ => out.push_str(&clean),
        }
    }
}
