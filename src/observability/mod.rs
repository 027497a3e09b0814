//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, one `run` span per invocation)
//!     → metrics.rs (attempt / failure / switch / post counters)
//! ```
//!
//! # Design Decisions
//! - Structured fields (`attempt`, `channel`, `delay_ms`) over formatted text
//! - A run id (UUID v4) on the root span correlates every line of one run
//! - Credentials are never recorded

pub mod logging;
pub mod metrics;
