//! HTML presentation of rendered blocks.
//!
//! Every text payload is escaped; the only tags emitted are the fixed ones
//! chosen per block and span variant.

use crate::conversations::Message;

use super::block::{Block, InlineText, Span};
use super::MessageRenderer;

/// Render blocks to an HTML fragment.
#[must_use]
pub fn blocks_to_html(blocks: &[Block]) -> String {
    let mut out = String::new();
    for block in blocks {
        match block {
            Block::Header { text } => {
                out.push_str("<h3>");
                push_inline(&mut out, text);
                out.push_str("</h3>");
            }
            Block::List { items } => {
                out.push_str("<ul>");
                for item in items {
                    out.push_str("<li>");
                    push_inline(&mut out, item);
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
            }
            Block::Paragraph { text } => {
                out.push_str("<p>");
                push_inline(&mut out, text);
                out.push_str("</p>");
            }
            Block::Spacer => out.push_str(r#"<div class="spacer"></div>"#),
        }
    }
    out
}

/// Render user-authored text verbatim inside a `<pre>` element.
#[must_use]
pub fn user_text_to_html(content: &str) -> String {
    let mut out = String::from(r#"<pre class="user-message">"#);
    push_escaped(&mut out, content);
    out.push_str("</pre>");
    out
}

/// Render a stored message: assistant text through the renderer, user text verbatim.
#[must_use]
pub fn message_to_html(renderer: &MessageRenderer, message: &Message) -> String {
    if message.is_user() {
        user_text_to_html(&message.content)
    } else {
        blocks_to_html(&renderer.render(&message.content))
    }
}

fn push_inline(out: &mut String, text: &InlineText) {
    for span in text.spans() {
        let (open, close) = match span {
            Span::Text(_) => ("", ""),
            Span::Bold(_) => ("<strong>", "</strong>"),
            Span::Italic(_) => ("<em>", "</em>"),
            Span::Code(_) => ("<code>", "</code>"),
        };
        out.push_str(open);
        push_escaped(out, span.text());
        out.push_str(close);
    }
}

fn push_escaped(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}
