//! Participant-centric read model over the booking event streams.
//!
//! The write side answers "what is the state of slot X?". This module
//! answers the inverse query: "across all slots, where does participant P
//! stand?". [`ParticipantSlotsProjection`] folds every slot's events into a
//! table keyed by `(slot_id, participant_id)`, one row per pair, holding
//! that participant's current status in that slot.
//!
//! The projection is eventually consistent: rows appear shortly after the
//! write side persists, not atomically with it. Updates are idempotent
//! upserts and deletes, so replaying or redelivering an event converges to
//! the same table.

use crate::events::BookingEvent;
use crate::types::{ParticipantId, ParticipantType, SlotStatus};
use flight_slots_core::projection::{Projection, ProjectionError};
use flight_slots_core::stream::SlotId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::{RwLock, broadcast};
use tokio::task::JoinHandle;

/// One row of the participant-status table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRow {
    /// The slot this row describes.
    pub slot_id: SlotId,
    /// The participant this row describes.
    pub participant_id: ParticipantId,
    /// The participant's role in this slot.
    pub participant_type: ParticipantType,
    /// The booking the participant belongs to, or empty when the row
    /// records availability rather than a booking.
    pub booking_id: String,
    /// Whether the participant is available or booked in this slot.
    pub status: SlotStatus,
}

/// In-memory participant-status table, fed one event at a time.
///
/// Handlers are pure upserts/deletes on the row keyed by the event's
/// `(slot_id, participant_id)`; delivering the same event twice lands in
/// the same final table.
#[derive(Debug, Default)]
pub struct ParticipantSlotsProjection {
    rows: HashMap<(SlotId, ParticipantId), SlotRow>,
}

impl ParticipantSlotsProjection {
    /// Create an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rows currently in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// All rows for a participant across every slot, ordered by slot id.
    #[must_use]
    pub fn slots_for_participant(&self, participant_id: &ParticipantId) -> Vec<SlotRow> {
        let mut rows: Vec<SlotRow> = self
            .rows
            .values()
            .filter(|row| &row.participant_id == participant_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.slot_id.cmp(&b.slot_id));
        rows
    }

    /// The participant's rows filtered to one status, ordered by slot id.
    #[must_use]
    pub fn slots_for_participant_with_status(
        &self,
        participant_id: &ParticipantId,
        status: SlotStatus,
    ) -> Vec<SlotRow> {
        let mut rows = self.slots_for_participant(participant_id);
        rows.retain(|row| row.status == status);
        rows
    }

    fn upsert(&mut self, row: SlotRow) {
        self.rows
            .insert((row.slot_id.clone(), row.participant_id.clone()), row);
    }

    fn delete(&mut self, slot_id: &SlotId, participant_id: &ParticipantId) {
        // Deleting an absent row is a no-op: redelivery and out-of-order
        // observation both land here.
        self.rows
            .remove(&(slot_id.clone(), participant_id.clone()));
    }

    fn check_well_formed(event: &BookingEvent) -> Result<(), ProjectionError> {
        let participant = event.participant();
        if participant.id.as_str().is_empty() {
            return Err(ProjectionError::Consistency(format!(
                "event {} carries an empty participant id for slot {}",
                event_name(event),
                event.slot_id()
            )));
        }
        Ok(())
    }
}

fn event_name(event: &BookingEvent) -> &'static str {
    match event {
        BookingEvent::ParticipantMarkedAvailable { .. } => "ParticipantMarkedAvailable",
        BookingEvent::ParticipantUnmarkedAvailable { .. } => "ParticipantUnmarkedAvailable",
        BookingEvent::ParticipantBooked { .. } => "ParticipantBooked",
        BookingEvent::ParticipantCanceled { .. } => "ParticipantCanceled",
    }
}

impl Projection for ParticipantSlotsProjection {
    type Event = BookingEvent;

    fn handle_event(&mut self, event: &Self::Event) -> Result<(), ProjectionError> {
        Self::check_well_formed(event)?;
        match event {
            BookingEvent::ParticipantMarkedAvailable {
                slot_id,
                participant_id,
                participant_type,
            } => {
                self.upsert(SlotRow {
                    slot_id: slot_id.clone(),
                    participant_id: participant_id.clone(),
                    participant_type: *participant_type,
                    booking_id: String::new(),
                    status: SlotStatus::Available,
                });
            }
            BookingEvent::ParticipantUnmarkedAvailable {
                slot_id,
                participant_id,
                ..
            }
            | BookingEvent::ParticipantCanceled {
                slot_id,
                participant_id,
                ..
            } => {
                self.delete(slot_id, participant_id);
            }
            BookingEvent::ParticipantBooked {
                slot_id,
                participant_id,
                participant_type,
                booking_id,
            } => {
                // Overwrites the "available" row for the same pair: booking
                // consumes availability.
                self.upsert(SlotRow {
                    slot_id: slot_id.clone(),
                    participant_id: participant_id.clone(),
                    participant_type: *participant_type,
                    booking_id: booking_id.as_str().to_string(),
                    status: SlotStatus::Booked,
                });
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "participant_slots"
    }

    fn reset(&mut self) {
        self.rows.clear();
    }
}

/// A live [`ParticipantSlotsProjection`] fed by a background task.
///
/// The task consumes the scheduler's broadcast stream and folds each event
/// into the shared table. If the consumer falls behind the channel capacity
/// or receives a malformed event, the index records a fatal consistency
/// fault: its history now has a gap it cannot repair, so every subsequent
/// query fails until the index is rebuilt from a fresh subscription.
pub struct ParticipantSlotIndex {
    projection: Arc<RwLock<ParticipantSlotsProjection>>,
    fault: Arc<StdMutex<Option<String>>>,
    consumer: JoinHandle<()>,
}

impl ParticipantSlotIndex {
    /// Spawn the consumer task over a scheduler subscription.
    #[must_use]
    pub fn spawn(mut events: broadcast::Receiver<BookingEvent>) -> Self {
        let projection = Arc::new(RwLock::new(ParticipantSlotsProjection::new()));
        let fault: Arc<StdMutex<Option<String>>> = Arc::new(StdMutex::new(None));

        let task_projection = Arc::clone(&projection);
        let task_fault = Arc::clone(&fault);
        let consumer = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => {
                        let mut projection = task_projection.write().await;
                        if let Err(err) = projection.handle_event(&event) {
                            tracing::error!(%err, "projection update failed");
                            record_fault(&task_fault, err.to_string());
                            return;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::error!(skipped, "projection consumer lagged");
                        record_fault(
                            &task_fault,
                            format!("consumer lagged and dropped {skipped} events"),
                        );
                        return;
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("event channel closed, consumer stopping");
                        return;
                    }
                }
            }
        });

        Self {
            projection,
            fault,
            consumer,
        }
    }

    /// All rows for a participant across every slot, ordered by slot id.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Consistency`] once the index has recorded
    /// a fault; the table can no longer be trusted.
    pub async fn slots_for_participant(
        &self,
        participant_id: &ParticipantId,
    ) -> Result<Vec<SlotRow>, ProjectionError> {
        self.check_fault()?;
        Ok(self
            .projection
            .read()
            .await
            .slots_for_participant(participant_id))
    }

    /// The participant's rows filtered to one status, ordered by slot id.
    ///
    /// # Errors
    ///
    /// Returns [`ProjectionError::Consistency`] once the index has recorded
    /// a fault.
    pub async fn slots_for_participant_with_status(
        &self,
        participant_id: &ParticipantId,
        status: SlotStatus,
    ) -> Result<Vec<SlotRow>, ProjectionError> {
        self.check_fault()?;
        Ok(self
            .projection
            .read()
            .await
            .slots_for_participant_with_status(participant_id, status))
    }

    /// Whether the index has recorded a fatal fault.
    #[must_use]
    pub fn is_faulted(&self) -> bool {
        self.check_fault().is_err()
    }

    fn check_fault(&self) -> Result<(), ProjectionError> {
        let fault = match self.fault.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match fault.as_ref() {
            Some(reason) => Err(ProjectionError::Consistency(reason.clone())),
            None => Ok(()),
        }
    }
}

impl Drop for ParticipantSlotIndex {
    fn drop(&mut self) {
        self.consumer.abort();
    }
}

fn record_fault(fault: &Arc<StdMutex<Option<String>>>, reason: String) {
    let mut fault = match fault.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    };
    fault.get_or_insert(reason);
}
