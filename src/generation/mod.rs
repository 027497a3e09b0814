//! Generation (Gemini) subsystem.
//!
//! # Data Flow
//! ```text
//! Job prompt
//!     → resilience::Invoker (retry + credential fallback)
//!         → client.rs (POST generateContent with the active key)
//!     → types.rs (first candidate's text, possibly empty)
//!     → Job (empty text → placeholder)
//! ```

pub mod client;
pub mod types;

pub use client::GeminiClient;
pub use types::{GenerationError, GenerationResult};
