//! Per-slot single-writer command runtime.
//!
//! [`SlotScheduler`] is the boundary the command gateway talks to. It routes
//! each command to the aggregate instance owning the addressed slot and runs
//! the whole validate → append → apply sequence as one critical section per
//! slot:
//!
//! - Commands for the **same** slot execute one at a time, in arrival order.
//!   Two concurrent bookings can never both observe "available" and
//!   double-book a participant.
//! - Commands for **different** slots share no mutable state and run fully
//!   in parallel.
//!
//! The append to the event store is synchronous and durable before a command
//! returns success; if it fails, nothing is applied and the error surfaces
//! as a retryable [`SchedulerError::Store`]. After a successful append the
//! events are published to a broadcast channel that projectors subscribe to;
//! the scheduler never waits for them.

use crate::aggregate::{self, BookingCommand};
use crate::error::SchedulerError;
use crate::events::BookingEvent;
use crate::types::Timeslot;
use chrono::Utc;
use flight_slots_core::event::{Event, SerializedEvent};
use flight_slots_core::event_store::EventStore;
use flight_slots_core::stream::{SlotId, Version};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{Mutex, broadcast};

/// Default capacity of the event fan-out channel.
///
/// Projectors that fall further behind than this observe a lag fault and
/// must rebuild; see `ParticipantSlotIndex`.
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 1024;

/// One slot's writer: the rehydrated state plus the stream version used for
/// optimistic concurrency. Guarded by a per-slot async mutex — the
/// single-writer serialization point.
struct SlotWriter {
    state: Timeslot,
    version: Version,
    hydrated: bool,
}

/// Routes commands to per-slot aggregate instances and fans persisted events
/// out to projectors.
pub struct SlotScheduler {
    store: Arc<dyn EventStore>,
    writers: StdMutex<HashMap<SlotId, Arc<Mutex<SlotWriter>>>>,
    events_tx: broadcast::Sender<BookingEvent>,
}

impl SlotScheduler {
    /// Create a scheduler over the given event store.
    #[must_use]
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self::with_channel_capacity(store, DEFAULT_EVENT_CHANNEL_CAPACITY)
    }

    /// Create a scheduler with an explicit fan-out channel capacity.
    #[must_use]
    pub fn with_channel_capacity(store: Arc<dyn EventStore>, capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity);
        Self {
            store,
            writers: StdMutex::new(HashMap::new()),
            events_tx,
        }
    }

    /// Subscribe to the union of all slots' event streams.
    ///
    /// Events for one slot arrive in their stream order; interleaving across
    /// slots is arbitrary. Delivery is at-least-once from the consumer's
    /// perspective, and the projector's upserts/deletes are idempotent.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BookingEvent> {
        self.events_tx.subscribe()
    }

    /// Execute a command against the addressed slot.
    ///
    /// Validation, the durable append and state application happen under the
    /// slot's writer lock. Either every event of the command's batch is
    /// appended and applied, or none are.
    ///
    /// # Errors
    ///
    /// - [`SchedulerError::InvalidState`]: the command violates a booking
    ///   rule; state is unchanged and retrying without a state change will
    ///   fail again.
    /// - [`SchedulerError::Store`]: the append failed; state is unchanged
    ///   and the command may be retried.
    pub async fn invoke(
        &self,
        slot_id: &SlotId,
        command: BookingCommand,
    ) -> Result<(), SchedulerError> {
        let writer = self.writer(slot_id);
        let mut writer = writer.lock().await;
        self.hydrate(slot_id, &mut writer).await?;

        let events = aggregate::decide(&writer.state, slot_id, &command).inspect_err(|err| {
            tracing::debug!(slot_id = %slot_id, %err, "command rejected");
        })?;

        let mut serialized = Vec::with_capacity(events.len());
        for event in &events {
            serialized.push(SerializedEvent::from_event(event, Some(event_metadata(slot_id)))?);
        }

        let new_version = self
            .store
            .append_events(slot_id.clone(), Some(writer.version), serialized)
            .await
            .inspect_err(|err| {
                tracing::error!(slot_id = %slot_id, %err, "event append failed");
            })?;

        for event in &events {
            aggregate::apply(&mut writer.state, event);
        }
        writer.version = new_version;

        tracing::info!(
            slot_id = %slot_id,
            events = events.len(),
            version = %new_version,
            "command applied"
        );

        for event in events {
            // A send error only means no projector is subscribed right now.
            let _ = self.events_tx.send(event);
        }

        Ok(())
    }

    /// Read the slot's current state, verbatim.
    ///
    /// The snapshot includes the full internal state; callers needing a
    /// public-safe, deterministically ordered representation use
    /// [`Timeslot::to_view`](crate::types::Timeslot::to_view).
    ///
    /// # Errors
    ///
    /// Returns [`SchedulerError::Store`] or [`SchedulerError::Serialization`]
    /// if rehydrating the slot from the event log fails.
    pub async fn get_slot(&self, slot_id: &SlotId) -> Result<Timeslot, SchedulerError> {
        let writer = self.writer(slot_id);
        let mut writer = writer.lock().await;
        self.hydrate(slot_id, &mut writer).await?;
        Ok(writer.state.clone())
    }

    /// Get or lazily create the writer for a slot. Slots are created empty
    /// on first touch and live indefinitely.
    fn writer(&self, slot_id: &SlotId) -> Arc<Mutex<SlotWriter>> {
        let mut writers = match self.writers.lock() {
            Ok(guard) => guard,
            // The registry map holds no invariants beyond the entries
            // themselves; a poisoned lock still has a usable map.
            Err(poisoned) => poisoned.into_inner(),
        };
        writers
            .entry(slot_id.clone())
            .or_insert_with(|| {
                Arc::new(Mutex::new(SlotWriter {
                    state: Timeslot::new(),
                    version: Version::INITIAL,
                    hydrated: false,
                }))
            })
            .clone()
    }

    /// Rebuild the writer's state by replaying its stream, once per process
    /// lifetime. The transition function is pure, so replay yields exactly
    /// the state the original commands produced.
    async fn hydrate(
        &self,
        slot_id: &SlotId,
        writer: &mut SlotWriter,
    ) -> Result<(), SchedulerError> {
        if writer.hydrated {
            return Ok(());
        }

        let stored = self.store.load_events(slot_id.clone(), None).await?;
        let mut state = Timeslot::new();
        for record in &stored {
            let event = BookingEvent::from_bytes(&record.data)?;
            aggregate::apply(&mut state, &event);
        }

        let replayed = stored.len() as u64;
        writer.state = state;
        writer.version = Version::new(replayed);
        writer.hydrated = true;

        if replayed > 0 {
            tracing::debug!(slot_id = %slot_id, events = replayed, "slot rehydrated");
        }
        Ok(())
    }
}

/// Metadata attached to every persisted event record.
fn event_metadata(slot_id: &SlotId) -> serde_json::Value {
    serde_json::json!({
        "slot_id": slot_id.as_str(),
        "timestamp": Utc::now().to_rfc3339(),
    })
}
