//! Test doubles for the event store.
//!
//! [`InMemoryEventStore`] implements the full
//! [`EventStore`](flight_slots_core::event_store::EventStore) contract over a
//! hash map: atomic batch appends, optimistic concurrency, ordered replay.
//! It backs unit and integration tests that exercise the scheduler without a
//! durable backend.
//!
//! [`FailingEventStore`] rejects every append, for asserting that commands
//! leave aggregate state untouched when persistence fails. [`init_tracing`]
//! installs a test-writer subscriber so `RUST_LOG` works in test runs.

use flight_slots_core::event::SerializedEvent;
use flight_slots_core::event_store::{EventStore, EventStoreError};
use flight_slots_core::stream::{SlotId, Version};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber for test output.
///
/// Honors `RUST_LOG`, defaults to `info`. Safe to call from every test;
/// only the first call installs a subscriber.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// In-memory event store: one ordered `Vec` of events per slot stream.
///
/// A stream's version is the number of events in it. Appends are atomic —
/// the batch is pushed under one lock acquisition, after the version check.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    streams: Mutex<HashMap<SlotId, Vec<SerializedEvent>>>,
}

impl InMemoryEventStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events currently stored for a slot.
    #[must_use]
    pub fn stream_len(&self, slot_id: &SlotId) -> usize {
        self.lock().get(slot_id).map_or(0, Vec::len)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<SlotId, Vec<SerializedEvent>>> {
        match self.streams.lock() {
            Ok(guard) => guard,
            // A panic while holding the lock cannot leave a half-pushed
            // batch: the version check and the extend happen between await
            // points, under one acquisition.
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl EventStore for InMemoryEventStore {
    fn append_events(
        &self,
        slot_id: SlotId,
        expected_version: Option<Version>,
        events: Vec<SerializedEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>> {
        Box::pin(async move {
            let mut streams = self.lock();
            let stream = streams.entry(slot_id.clone()).or_default();
            let actual = Version::new(stream.len() as u64);

            if let Some(expected) = expected_version {
                if expected != actual {
                    return Err(EventStoreError::ConcurrencyConflict {
                        slot_id,
                        expected,
                        actual,
                    });
                }
            }

            stream.extend(events);
            Ok(Version::new(stream.len() as u64))
        })
    }

    fn load_events(
        &self,
        slot_id: SlotId,
        from_version: Option<Version>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SerializedEvent>, EventStoreError>> + Send + '_>>
    {
        Box::pin(async move {
            let streams = self.lock();
            let Some(stream) = streams.get(&slot_id) else {
                return Ok(Vec::new());
            };

            let skip = from_version.map_or(0, |v| usize::try_from(v.value()).unwrap_or(usize::MAX));
            Ok(stream.iter().skip(skip).cloned().collect())
        })
    }
}

/// Event store whose appends always fail with a database error.
///
/// Loads succeed (returning the empty stream), so a scheduler can hydrate a
/// fresh slot and then observe the append failure path.
#[derive(Debug, Default)]
pub struct FailingEventStore;

impl FailingEventStore {
    /// Create the failing store.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl EventStore for FailingEventStore {
    fn append_events(
        &self,
        _slot_id: SlotId,
        _expected_version: Option<Version>,
        _events: Vec<SerializedEvent>,
    ) -> Pin<Box<dyn Future<Output = Result<Version, EventStoreError>> + Send + '_>> {
        Box::pin(async move {
            Err(EventStoreError::DatabaseError(
                "injected append failure".to_string(),
            ))
        })
    }

    fn load_events(
        &self,
        _slot_id: SlotId,
        _from_version: Option<Version>,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<SerializedEvent>, EventStoreError>> + Send + '_>>
    {
        Box::pin(async move { Ok(Vec::new()) })
    }
}
