//! Chat (Slack Web API) subsystem.
//!
//! # Data Flow
//! ```text
//! Job
//!     → client.rs (bearer-authenticated JSON calls)
//!         conversations.open / conversations.list → DM channel id
//!         conversations.history                   → recent messages
//!         chat.postMessage                        → post or threaded reply
//!     → types.rs (envelope check: `ok` flag, `error` string)
//! ```
//!
//! # Design Decisions
//! - Chat calls are not retried; only generation goes through the invoker
//! - `ok: false` is an error value carrying the API's error code
//! - The token never appears in `Debug` output or logs

pub mod client;
pub mod types;

pub use client::SlackClient;
pub use types::{ChatError, ChatResult, HistoryQuery, ImChannel, Message};
