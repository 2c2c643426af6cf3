//! Stock market chat: conversation history, assistant message rendering, and
//! the relay that forwards chat turns to a hosted language model.

// Forbidden practices
#![deny(unsafe_code)]
#![forbid(unsafe_op_in_unsafe_fn)]
#![deny(unused_must_use)]
#![deny(nonstandard_style)]
#![deny(overflowing_literals)]
#![warn(missing_docs)]
#![warn(unused_imports)]
#![warn(unused_variables)]

// Clippy
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
#![deny(clippy::module_inception)]
#![deny(clippy::redundant_clone)]

/// Terminal chat session and relay HTTP client.
pub mod client;
/// Environment-driven configuration.
pub mod config;
/// Conversation history and its key-value persistence.
pub mod conversations;
/// Chat relay towards the language model.
pub mod relay;
/// Markdown-subset rendering of assistant messages.
pub mod render;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Entry helpers to start the relay server.
pub mod start_stock_chat;
