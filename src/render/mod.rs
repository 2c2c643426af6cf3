//! Message renderer for assistant replies.
//!
//! Turns a small line-oriented markdown subset (section headers, bullet lists,
//! paragraphs, bold/italic/code spans) into a typed [`Block`] tree. The tree
//! carries no markup; [`html`] and [`terminal`] are the presentation steps and
//! escape every text payload they emit.
//!
//! User-authored messages never go through the renderer.

pub mod block;
pub mod html;
pub mod inline;
pub mod terminal;

use regex::Regex;

pub use block::{Block, InlineText, Span};
pub use inline::InlineStyler;

/// Line classifier and block builder.
pub struct MessageRenderer {
    header: Regex,
    header_markers: Regex,
    bullet: Regex,
    bullet_marker: Regex,
    inline: InlineStyler,
}

impl MessageRenderer {
    /// Compile the renderer's patterns.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            header: Regex::new(r"^\*\*.*\*\*:?$")?,
            header_markers: Regex::new(r"^\*\*|\*\*:?$")?,
            bullet: Regex::new(r"^[*\-•]\s")?,
            bullet_marker: Regex::new(r"^[*\-•]\s+")?,
            inline: InlineStyler::new()?,
        })
    }

    /// Render `content` into blocks.
    ///
    /// Each line is classified, first match wins: blank, section header,
    /// bullet item, paragraph. Consecutive bullets accumulate into one list.
    /// Blank lines become a single spacer, never leading and never doubled.
    #[must_use]
    pub fn render(&self, content: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut pending: Vec<InlineText> = Vec::new();

        for line in content.split('\n') {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                flush_list(&mut blocks, &mut pending);
                if blocks.last().is_some_and(|b| *b != Block::Spacer) {
                    blocks.push(Block::Spacer);
                }
                continue;
            }

            if self.header.is_match(trimmed) {
                flush_list(&mut blocks, &mut pending);
                let stripped = self.header_markers.replace_all(trimmed, "");
                // `**Title:**` keeps its colon inside the markers.
                let text = stripped.strip_suffix(':').unwrap_or(&stripped).trim();
                blocks.push(Block::Header {
                    text: self.inline.style(text),
                });
                continue;
            }

            if self.bullet.is_match(trimmed) {
                let item = self.bullet_marker.replace(trimmed, "");
                pending.push(self.inline.style(&item));
                continue;
            }

            flush_list(&mut blocks, &mut pending);
            blocks.push(Block::Paragraph {
                text: self.inline.style(trimmed),
            });
        }

        flush_list(&mut blocks, &mut pending);
        blocks
    }
}

fn flush_list(blocks: &mut Vec<Block>, pending: &mut Vec<InlineText>) {
    if !pending.is_empty() {
        blocks.push(Block::List {
            items: std::mem::take(pending),
        });
    }
}
