//! Primary/secondary credential selection.
//!
//! # Security
//! - Credential values are never logged; `Debug` is redacted
//! - Which slot is active is safe to log

use std::fmt;
use std::future::Future;

use crate::observability::metrics;

/// An opaque API token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for placing into a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// Which of the two credentials is in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSlot {
    Primary,
    Secondary,
}

impl fmt::Display for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSlot::Primary => f.write_str("primary"),
            CredentialSlot::Secondary => f.write_str("secondary"),
        }
    }
}

/// The known credentials and the one currently active.
///
/// Owned by the caller and passed by `&mut` to every call that needs a
/// credential, so a switch made by one call is seen by all later calls
/// sharing the same set.
#[derive(Debug, Clone)]
pub struct CredentialSet {
    primary: Credential,
    secondary: Option<Credential>,
    active: CredentialSlot,
}

impl CredentialSet {
    pub fn new(primary: Credential) -> Self {
        Self {
            primary,
            secondary: None,
            active: CredentialSlot::Primary,
        }
    }

    pub fn with_secondary(mut self, secondary: Option<Credential>) -> Self {
        self.secondary = secondary;
        self
    }

    pub fn active(&self) -> &Credential {
        match (self.active, &self.secondary) {
            (CredentialSlot::Secondary, Some(secondary)) => secondary,
            _ => &self.primary,
        }
    }

    pub fn active_slot(&self) -> CredentialSlot {
        self.active
    }

    pub fn has_secondary(&self) -> bool {
        self.secondary.is_some()
    }

    /// Switch to the secondary credential.
    ///
    /// Returns false when there is no secondary or it is already active.
    pub fn switch_to_secondary(&mut self) -> bool {
        if self.active == CredentialSlot::Secondary || self.secondary.is_none() {
            return false;
        }
        self.active = CredentialSlot::Secondary;
        metrics::record_credential_switch();
        true
    }
}

/// Run `operation` with the active credential, falling back to the secondary
/// once if the primary fails.
///
/// The fallback call's outcome is final. Without a configured secondary, or
/// once the secondary is already active, the first failure is returned as is.
pub async fn with_fallback<T, E, F, Fut>(credentials: &mut CredentialSet, mut operation: F) -> Result<T, E>
where
    F: FnMut(Credential) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let slot = credentials.active_slot();
    let err = match operation(credentials.active().clone()).await {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    if !credentials.switch_to_secondary() {
        tracing::debug!(slot = %slot, error = %err, "No credential left to fall back to");
        return Err(err);
    }

    tracing::warn!(
        error = %err,
        "Primary credential failed, switching to secondary"
    );
    operation(credentials.active().clone()).await
}
