//! Metric counters.
//!
//! # Metrics
//! - `courier_invoke_attempts_total` (counter): attempts by operation
//! - `courier_invoke_failures_total` (counter): failed attempts by operation
//! - `courier_credential_switches_total` (counter): primary → secondary switches
//! - `courier_messages_posted_total` (counter): chat messages posted by job
//!
//! No exporter is installed by the binary; a run is too short-lived to be
//! scraped. An embedding application may install any `metrics` recorder.

pub fn record_attempt(operation: &'static str) {
    ::metrics::counter!("courier_invoke_attempts_total", "operation" => operation).increment(1);
}

pub fn record_failure(operation: &'static str) {
    ::metrics::counter!("courier_invoke_failures_total", "operation" => operation).increment(1);
}

pub fn record_credential_switch() {
    ::metrics::counter!("courier_credential_switches_total").increment(1);
}

pub fn record_message_posted(job: &'static str) {
    ::metrics::counter!("courier_messages_posted_total", "job" => job).increment(1);
}
