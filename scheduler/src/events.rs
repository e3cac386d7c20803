//! Booking events: the only mechanism that mutates timeslot state.
//!
//! Every state change in a slot is recorded as one of four facts. A booking
//! command persists three `ParticipantBooked` events (student, instructor,
//! aircraft) as a single atomic batch; a cancellation persists one
//! `ParticipantCanceled` per booking row it removes.

use crate::types::{BookingId, Participant, ParticipantId, ParticipantType};
use flight_slots_core::event::Event;
use flight_slots_core::stream::SlotId;
use serde::{Deserialize, Serialize};

/// Events emitted by the booking slot aggregate.
///
/// Each variant carries the slot it belongs to and the participant it
/// concerns, so the participant-status projector can index rows by
/// `(slot_id, participant_id)` without consulting the aggregate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingEvent {
    /// A participant declared availability for the slot.
    ParticipantMarkedAvailable {
        /// Slot the availability applies to.
        slot_id: SlotId,
        /// The participant's identifier.
        participant_id: ParticipantId,
        /// The participant's role.
        participant_type: ParticipantType,
    },

    /// A participant withdrew availability for the slot.
    ParticipantUnmarkedAvailable {
        /// Slot the availability applied to.
        slot_id: SlotId,
        /// The participant's identifier.
        participant_id: ParticipantId,
        /// The participant's role.
        participant_type: ParticipantType,
    },

    /// A participant was booked. Emitted three times per booking command,
    /// once per role, all sharing one booking id.
    ParticipantBooked {
        /// Slot the booking applies to.
        slot_id: SlotId,
        /// The participant's identifier.
        participant_id: ParticipantId,
        /// The participant's role.
        participant_type: ParticipantType,
        /// The booking this participant belongs to.
        booking_id: BookingId,
    },

    /// A participant's booking was canceled. Emitted once per booking row
    /// removed by a cancellation.
    ParticipantCanceled {
        /// Slot the booking applied to.
        slot_id: SlotId,
        /// The participant's identifier.
        participant_id: ParticipantId,
        /// The participant's role.
        participant_type: ParticipantType,
        /// The canceled booking.
        booking_id: BookingId,
    },
}

impl BookingEvent {
    /// The slot this event belongs to.
    #[must_use]
    pub const fn slot_id(&self) -> &SlotId {
        match self {
            Self::ParticipantMarkedAvailable { slot_id, .. }
            | Self::ParticipantUnmarkedAvailable { slot_id, .. }
            | Self::ParticipantBooked { slot_id, .. }
            | Self::ParticipantCanceled { slot_id, .. } => slot_id,
        }
    }

    /// The participant this event concerns.
    #[must_use]
    pub fn participant(&self) -> Participant {
        match self {
            Self::ParticipantMarkedAvailable {
                participant_id,
                participant_type,
                ..
            }
            | Self::ParticipantUnmarkedAvailable {
                participant_id,
                participant_type,
                ..
            }
            | Self::ParticipantBooked {
                participant_id,
                participant_type,
                ..
            }
            | Self::ParticipantCanceled {
                participant_id,
                participant_type,
                ..
            } => Participant::new(participant_id.clone(), *participant_type),
        }
    }

    /// The booking id, for the two variants that carry one.
    #[must_use]
    pub const fn booking_id(&self) -> Option<&BookingId> {
        match self {
            Self::ParticipantBooked { booking_id, .. }
            | Self::ParticipantCanceled { booking_id, .. } => Some(booking_id),
            Self::ParticipantMarkedAvailable { .. } | Self::ParticipantUnmarkedAvailable { .. } => {
                None
            }
        }
    }
}

impl Event for BookingEvent {
    fn event_type(&self) -> &'static str {
        match self {
            Self::ParticipantMarkedAvailable { .. } => "ParticipantMarkedAvailable.v1",
            Self::ParticipantUnmarkedAvailable { .. } => "ParticipantUnmarkedAvailable.v1",
            Self::ParticipantBooked { .. } => "ParticipantBooked.v1",
            Self::ParticipantCanceled { .. } => "ParticipantCanceled.v1",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn booked_event() -> BookingEvent {
        BookingEvent::ParticipantBooked {
            slot_id: SlotId::new("bestslot"),
            participant_id: ParticipantId::new("alice"),
            participant_type: ParticipantType::Student,
            booking_id: BookingId::new("booking1"),
        }
    }

    #[test]
    fn event_types_are_stable() {
        let marked = BookingEvent::ParticipantMarkedAvailable {
            slot_id: SlotId::new("bestslot"),
            participant_id: ParticipantId::new("alice"),
            participant_type: ParticipantType::Student,
        };
        assert_eq!(marked.event_type(), "ParticipantMarkedAvailable.v1");
        assert_eq!(booked_event().event_type(), "ParticipantBooked.v1");
    }

    #[test]
    #[allow(clippy::expect_used)] // Panics: Test will fail if serialization fails
    fn serialization_roundtrip() {
        let event = booked_event();
        let bytes = event.to_bytes().expect("serialization should succeed");
        let back = BookingEvent::from_bytes(&bytes).expect("deserialization should succeed");
        assert_eq!(event, back);
    }

    #[test]
    fn accessors_expose_participant_and_booking() {
        let event = booked_event();
        assert_eq!(event.slot_id(), &SlotId::new("bestslot"));
        assert_eq!(
            event.participant(),
            Participant::new("alice", ParticipantType::Student)
        );
        assert_eq!(event.booking_id(), Some(&BookingId::new("booking1")));

        let unmarked = BookingEvent::ParticipantUnmarkedAvailable {
            slot_id: SlotId::new("bestslot"),
            participant_id: ParticipantId::new("alice"),
            participant_type: ParticipantType::Student,
        };
        assert_eq!(unmarked.booking_id(), None);
    }
}
