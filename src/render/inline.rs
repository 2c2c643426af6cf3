//! Inline-style substitution: bold, italic and inline code spans.
//!
//! Rules run in a fixed order over the still-unstyled parts of the text, so a
//! run claimed by an earlier rule is never re-matched by a later one. Each
//! rule pairs a marker with the nearest closing marker (non-greedy); markers
//! that never close stay in the text as literal characters.

use regex::Regex;

use super::block::{InlineText, Span};

#[derive(Clone, Copy, Debug)]
enum SpanStyle {
    Bold,
    Italic,
    Code,
}

impl SpanStyle {
    fn span(self, text: &str) -> Span {
        let text = text.to_string();
        match self {
            Self::Bold => Span::Bold(text),
            Self::Italic => Span::Italic(text),
            Self::Code => Span::Code(text),
        }
    }
}

struct InlineRule {
    pattern: Regex,
    style: SpanStyle,
}

/// Applies the inline substitution rules.
pub struct InlineStyler {
    rules: Vec<InlineRule>,
}

impl InlineStyler {
    /// Compile the substitution rules.
    ///
    /// # Errors
    /// Returns an error if any regex pattern is invalid.
    pub fn new() -> Result<Self, regex::Error> {
        let rules = vec![
            InlineRule {
                pattern: Regex::new(r"\*\*(.+?)\*\*")?,
                style: SpanStyle::Bold,
            },
            InlineRule {
                pattern: Regex::new(r"__(.+?)__")?,
                style: SpanStyle::Bold,
            },
            InlineRule {
                pattern: Regex::new(r"\*(.+?)\*")?,
                style: SpanStyle::Italic,
            },
            InlineRule {
                pattern: Regex::new(r"_(.+?)_")?,
                style: SpanStyle::Italic,
            },
            InlineRule {
                pattern: Regex::new(r"`(.+?)`")?,
                style: SpanStyle::Code,
            },
        ];
        Ok(Self { rules })
    }

    /// Split `text` into styled spans.
    #[must_use]
    pub fn style(&self, text: &str) -> InlineText {
        let mut spans = vec![Span::Text(text.to_string())];

        for rule in &self.rules {
            let mut next = Vec::with_capacity(spans.len());
            for span in spans {
                match span {
                    Span::Text(raw) => split_text(&raw, rule, &mut next),
                    styled => next.push(styled),
                }
            }
            spans = next;
        }

        InlineText(spans)
    }
}

fn split_text(text: &str, rule: &InlineRule, out: &mut Vec<Span>) {
    let mut last = 0;

    for caps in rule.pattern.captures_iter(text) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            out.push(Span::Text(text[last..whole.start()].to_string()));
        }
        out.push(rule.style.span(inner.as_str()));
        last = whole.end();
    }

    if last < text.len() {
        out.push(Span::Text(text[last..].to_string()));
    }
}
