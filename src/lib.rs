//! DM courier: generate text and post it to a chat DM, one job per run.

pub mod chat;
pub mod config;
pub mod generation;
pub mod jobs;
pub mod observability;
pub mod resilience;

pub use config::CourierConfig;
pub use jobs::{Job, JobContext, JobError, JobReport};
pub use resilience::{Credential, CredentialSet, Invoker, RetryPolicy};
