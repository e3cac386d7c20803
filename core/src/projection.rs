//! Projection trait for building read models from the event stream.
//!
//! Projections are the query side of the system. The booking slot aggregate
//! answers "what is the state of slot X"; projections answer the inverted
//! question — "which slots is participant Y available or booked in" — by
//! consuming the union of all slots' event streams and maintaining a
//! denormalized index.
//!
//! Projections are **eventually consistent** with the aggregates: a reader
//! may observe a booking on the aggregate before the corresponding row
//! appears in the projection. They are also **rebuildable**: dropping the
//! index and replaying all events reproduces it exactly.
//!
//! Delivery to a projection is at-least-once; handlers must therefore be
//! idempotent (full-overwrite upserts and keyed deletes are).

use thiserror::Error;

/// Error type for projection operations.
#[derive(Debug, Error)]
pub enum ProjectionError {
    /// Storage backend error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// An event could not be processed.
    #[error("Event processing error: {0}")]
    EventProcessing(String),

    /// The projection observed a malformed or out-of-order event stream.
    ///
    /// This is a fatal fault: the index can no longer be trusted and must be
    /// rebuilt. It is surfaced to operators, never silently ignored.
    #[error("Consistency fault: {0}")]
    Consistency(String),
}

/// Result type for projection operations.
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// A projection builds and maintains a read model from events.
///
/// # Example
///
/// ```ignore
/// impl Projection for ParticipantSlotsProjection {
///     type Event = BookingEvent;
///
///     fn handle_event(&mut self, event: &BookingEvent) -> Result<()> {
///         match event {
///             BookingEvent::ParticipantMarkedAvailable { .. } => { /* upsert row */ }
///             BookingEvent::ParticipantUnmarkedAvailable { .. } => { /* delete row */ }
///             // ...
///         }
///         Ok(())
///     }
///
///     fn name(&self) -> &'static str {
///         "participant_slots"
///     }
///
///     fn reset(&mut self) {
///         self.rows.clear();
///     }
/// }
/// ```
pub trait Projection: Send + Sync {
    /// The event type this projection consumes.
    type Event;

    /// Handle one event and update the projection's view.
    ///
    /// Called for each event in the stream. Handlers must be idempotent:
    /// the same event may be delivered more than once.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Consistency`] for malformed or out-of-order
    /// events, or [`ProjectionError::Storage`] if the backing index cannot be
    /// updated.
    fn handle_event(&mut self, event: &Self::Event) -> Result<()>;

    /// The projection's name (for logging and identification).
    fn name(&self) -> &'static str;

    /// Reset the projection to its initial, empty state.
    ///
    /// Used before replaying the full event history to rebuild the index.
    fn reset(&mut self);
}
