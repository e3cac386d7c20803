//! Event store trait for per-slot event streams.
//!
//! The event store is the durable, append-only log behind every booking slot
//! aggregate. Each slot owns one ordered stream; the aggregate appends event
//! batches with all-or-nothing semantics and rebuilds its state by replaying
//! the stream from the beginning.
//!
//! # Design
//!
//! The trait is deliberately minimal:
//!
//! - Append a batch of events to a slot's stream, atomically, with optimistic
//!   concurrency. A three-way booking persists as one batch: either all three
//!   `ParticipantBooked` events land or none do.
//! - Load a slot's events, in order, for replay.
//!
//! Projection management and subscriptions are not the store's job; the
//! scheduler publishes persisted events to its own fan-out.
//!
//! # Implementations
//!
//! - `InMemoryEventStore` (in `flight-slots-testing`): fast, deterministic
//!   testing. Durable backends implement the same contract.

use crate::event::SerializedEvent;
use crate::stream::{SlotId, Version};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during event store operations.
///
/// These are infrastructural faults, distinct from business-rule rejections:
/// a caller may retry an append that failed with a database error, but must
/// never see partially applied state from it.
#[derive(Error, Debug)]
pub enum EventStoreError {
    /// Optimistic concurrency conflict: expected version doesn't match the
    /// stream's current version. Another writer appended first.
    #[error("Concurrency conflict: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The slot stream where the conflict occurred.
        slot_id: SlotId,
        /// The version the writer expected the stream to be at.
        expected: Version,
        /// The actual current version of the stream.
        actual: Version,
    },

    /// Backend connection or query error.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// General I/O error.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Append-only, per-slot ordered event storage.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the scheduler shares one store
/// across all slot writers.
///
/// # Dyn Compatibility
///
/// The trait uses explicit `Pin<Box<dyn Future>>` returns instead of
/// `async fn` so it can be used as a trait object (`Arc<dyn EventStore>`)
/// injected into the scheduler.
pub trait EventStore: Send + Sync {
    /// Append a batch of events to a slot's stream.
    ///
    /// The batch is atomic: either every event is durably appended, in order,
    /// or none are. This is what makes multi-event commands (booking three
    /// participants, canceling a multi-row booking) safe.
    ///
    /// # Optimistic Concurrency
    ///
    /// - `Some(version)`: assert the stream is currently at this version.
    /// - `None`: append unconditionally (use with caution).
    ///
    /// # Returns
    ///
    /// The stream's new version. A stream at version 2 that receives a
    /// three-event batch ends at version 5.
    ///
    /// # Errors
    ///
    /// - [`EventStoreError::ConcurrencyConflict`]: version mismatch.
    /// - [`EventStoreError::DatabaseError`]: backend failure; nothing was
    ///   appended.
    fn append_events(
        &self,
        slot_id: SlotId,
        expected_version: Option<Version>,
        events: Vec<SerializedEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>>;

    /// Load events from a slot's stream, ordered oldest first.
    ///
    /// `from_version` selects the starting point: `Some(v)` loads events from
    /// version `v` onwards, `None` loads the whole stream. A stream that has
    /// never been written returns an empty vector, not an error — new slots
    /// start empty.
    ///
    /// # Errors
    ///
    /// - [`EventStoreError::DatabaseError`]: backend failure.
    /// - [`EventStoreError::SerializationError`]: stored data did not decode.
    fn load_events(
        &self,
        slot_id: SlotId,
        from_version: Option<Version>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SerializedEvent>, EventStoreError>> + Send + '_>>;
}
