//! Error types for the slot scheduler.

use flight_slots_core::event::EventError;
use flight_slots_core::event_store::EventStoreError;
use thiserror::Error;

/// Errors surfaced by slot commands.
///
/// Two distinct kinds flow through here, and callers must treat them
/// differently:
///
/// - [`SchedulerError::InvalidState`] is a business-rule rejection. The
///   command was understood and refused; retrying the identical command will
///   fail again until the slot's state changes.
/// - [`SchedulerError::Store`] and [`SchedulerError::Serialization`] are
///   infrastructural faults. Nothing was applied; the command may be retried.
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The command violates a booking rule for the slot's current state.
    ///
    /// The display output is the bare reason string; external callers and
    /// test fixtures assert on the exact wording.
    #[error("{0}")]
    InvalidState(String),

    /// The event log rejected or failed the append. Retryable.
    #[error("Event store failure: {0}")]
    Store(#[from] EventStoreError),

    /// An event could not be serialized or deserialized.
    #[error("Event serialization failure: {0}")]
    Serialization(#[from] EventError),
}

impl SchedulerError {
    /// Build an `InvalidState` rejection.
    pub(crate) fn invalid_state(reason: impl Into<String>) -> Self {
        Self::InvalidState(reason.into())
    }

    /// Whether retrying the same command can succeed without a state change.
    ///
    /// `InvalidState` reflects a business-rule violation and is not
    /// retryable; store and serialization failures are transient faults.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::InvalidState(_) => false,
            Self::Store(_) | Self::Serialization(_) => true,
        }
    }
}
