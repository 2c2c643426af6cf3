//! Chat client: relay transport and the session orchestrator that composes the
//! conversation store, the relay and the renderer.

pub mod dates;
pub mod errors;
pub mod relay_client;
pub mod session;

pub use dates::relative_date;
pub use errors::{ClientError, ClientResult};
pub use relay_client::{ChatTransport, RelayClient};
pub use session::{ChatSession, SUGGESTED_PROMPTS};
