//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Call to the generation API:
//!     → retries.rs (Invoker: attempt, wait, attempt again, up to the budget)
//!     → credentials.rs (on failure under the primary key, switch to the
//!                       secondary and repeat the call once)
//!     → backoff.rs (delay between attempts: fixed or exponential)
//! ```
//!
//! # Design Decisions
//! - Failures are values (`Result`), never panics
//! - The active credential lives in a `CredentialSet` owned by the caller
//! - A credential switch does not use up a retry attempt
//! - Empty results are not failures; callers substitute placeholders

pub mod backoff;
pub mod credentials;
pub mod retries;

pub use backoff::DelayStrategy;
pub use credentials::{with_fallback, Credential, CredentialSet, CredentialSlot};
pub use retries::{Invoker, RetryError, RetryPolicy};
