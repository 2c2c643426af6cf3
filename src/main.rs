//! Binary entrypoint for the stock chat relay server.
//!
//! Run with: `cargo run --bin stock-chat-server`

use std::process::ExitCode;

use stock_chat::start_stock_chat;

fn main() -> ExitCode {
    start_stock_chat::run()
}
