//! Transcript construction for the upstream model.
//!
//! Every transcript opens with a fixed persona/formatting exchange so the
//! model answers in the header/bullet/bold shape the message renderer expects.

use serde::Serialize;

use crate::conversations::{Message, Role};

/// Instruction sent as the opening user turn.
pub const SYSTEM_PREAMBLE: &str = "You are a helpful stock market assistant. Provide accurate, up-to-date information about stocks, markets, and financial news. Use web search to get the latest data when answering questions about current stock prices, market trends, or recent financial news.

IMPORTANT FORMATTING RULES:
1. Structure your responses with clear sections using bold headers like **Section Name:**
2. Use bullet points (- or *) for lists to make information scannable
3. Group related information together under relevant headers
4. For stock lists, organize by categories (e.g., **Top Gainers:**, **Banking Stocks:**, etc.)
5. Keep paragraphs short and concise
6. Use bold (**text**) for important terms like company names and key metrics
7. Add a brief summary or key takeaway at the end when relevant

Example format:
**Current Market Trends:**
The Indian stock market is showing positive momentum today.

**Top Gainers:**
- Company Name 1: Brief info
- Company Name 2: Brief info

**Key Insights:**
Brief summary of important points.";

/// Model acknowledgement following the preamble.
pub const PREAMBLE_ACK: &str = "I understand. I will provide well-structured, formatted responses using clear sections, bullet points, and bold text for easy reading. I will use web search to provide accurate and current stock market information.";

/// Default number of history entries forwarded upstream.
pub const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Speaker of a transcript turn, in the provider's vocabulary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// Human side.
    User,
    /// Model side.
    Model,
}

impl From<Role> for TurnRole {
    fn from(role: Role) -> Self {
        match role {
            Role::User => Self::User,
            Role::Assistant => Self::Model,
        }
    }
}

/// One entry of the transcript sent upstream.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    /// Speaker.
    pub role: TurnRole,
    /// Text of the turn.
    pub text: String,
}

impl Turn {
    fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Build the upstream transcript: preamble exchange, the last `window`
/// history entries, then `message`.
#[must_use]
pub fn build_transcript(message: &str, history: &[Message], window: usize) -> Vec<Turn> {
    let recent = &history[history.len().saturating_sub(window)..];

    let mut turns = Vec::with_capacity(recent.len() + 3);
    turns.push(Turn::new(TurnRole::User, SYSTEM_PREAMBLE));
    turns.push(Turn::new(TurnRole::Model, PREAMBLE_ACK));
    turns.extend(
        recent
            .iter()
            .map(|m| Turn::new(m.role.into(), m.content.clone())),
    );
    turns.push(Turn::new(TurnRole::User, message));
    turns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_without_history() {
        let turns = build_transcript("Price of TCS?", &[], DEFAULT_HISTORY_WINDOW);

        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0], Turn::new(TurnRole::User, SYSTEM_PREAMBLE));
        assert_eq!(turns[1], Turn::new(TurnRole::Model, PREAMBLE_ACK));
        assert_eq!(turns[2], Turn::new(TurnRole::User, "Price of TCS?"));
    }

    #[test]
    fn test_history_truncated_to_most_recent() {
        let history: Vec<Message> = (0..8)
            .map(|i| {
                if i % 2 == 0 {
                    Message::user(format!("q{i}"))
                } else {
                    Message::assistant(format!("a{i}"))
                }
            })
            .collect();

        let turns = build_transcript("next", &history, DEFAULT_HISTORY_WINDOW);

        assert_eq!(turns.len(), 2 + 5 + 1);
        let forwarded: Vec<&str> = turns[2..7].iter().map(|t| t.text.as_str()).collect();
        assert_eq!(forwarded, ["a3", "q4", "a5", "q6", "a7"]);
        assert_eq!(turns[2].role, TurnRole::Model);
        assert_eq!(turns[3].role, TurnRole::User);
    }

    #[test]
    fn test_preamble_asks_for_renderer_shapes() {
        assert!(SYSTEM_PREAMBLE.contains("**Section Name:**"));
        assert!(SYSTEM_PREAMBLE.contains("bullet points"));
    }
}
