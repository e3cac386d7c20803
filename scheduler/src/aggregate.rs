//! The booking slot aggregate: a pure state machine over one timeslot.
//!
//! Commands are validated against the current [`Timeslot`] state and either
//! rejected with an [`SchedulerError::InvalidState`] or turned into a batch
//! of [`BookingEvent`]s. State changes happen exclusively in [`apply`], the
//! deterministic transition function, which is also what [`replay`] folds
//! the stored event stream through during rehydration.
//!
//! The split between [`decide`] (validate, no mutation) and [`apply`]
//! (mutate, no validation) is what makes the aggregate replayable: replaying
//! a stored stream runs only `apply`, and must reproduce the exact state the
//! original commands produced.

use crate::error::SchedulerError;
use crate::events::BookingEvent;
use crate::types::{BookingId, Participant, ParticipantId, ParticipantType, Timeslot};
use flight_slots_core::stream::SlotId;
use smallvec::{SmallVec, smallvec};

/// Event batch produced by one command. A successful booking emits exactly
/// three events, which is the common worst case — hence the inline capacity.
pub type EventBatch = SmallVec<[BookingEvent; 3]>;

/// Commands accepted by the booking slot aggregate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BookingCommand {
    /// Declare a participant available for this slot.
    MarkAvailable {
        /// The participant declaring availability.
        participant: Participant,
    },

    /// Withdraw a participant's availability for this slot.
    UnmarkAvailable {
        /// The participant withdrawing availability.
        participant: Participant,
    },

    /// Book a training session: student, aircraft and instructor together,
    /// under one caller-supplied booking id.
    BookReservation {
        /// Identifier of the student to book.
        student_id: ParticipantId,
        /// Identifier of the aircraft to book.
        aircraft_id: ParticipantId,
        /// Identifier of the instructor to book.
        instructor_id: ParticipantId,
        /// Caller-supplied id grouping the three resulting bookings.
        booking_id: BookingId,
    },

    /// Cancel every booking row carrying the given booking id.
    CancelBooking {
        /// The booking to cancel.
        booking_id: BookingId,
    },
}

/// Validate a command against the slot's current state.
///
/// Pure: no mutation, no I/O. Returns the events to persist and apply, or an
/// `InvalidState` rejection carrying the caller-facing reason. The aggregate
/// guarantees all-or-nothing semantics at this level by never returning a
/// partial batch: a booking yields exactly three events or an error.
///
/// # Errors
///
/// Returns [`SchedulerError::InvalidState`] when the command violates a
/// booking rule; the reason strings are stable and asserted on by callers.
pub fn decide(
    state: &Timeslot,
    slot_id: &SlotId,
    command: &BookingCommand,
) -> Result<EventBatch, SchedulerError> {
    match command {
        BookingCommand::MarkAvailable { participant } => {
            if state.is_booked(participant) {
                return Err(SchedulerError::invalid_state(format!(
                    "Participant {} already booked for this slot. \
                     To mark the participant available, please cancel the booking first.",
                    participant.id
                )));
            }
            // Re-marking an already-available participant is deliberately
            // unguarded; set insertion makes it a no-op on application.
            Ok(smallvec![BookingEvent::ParticipantMarkedAvailable {
                slot_id: slot_id.clone(),
                participant_id: participant.id.clone(),
                participant_type: participant.participant_type,
            }])
        }

        BookingCommand::UnmarkAvailable { participant } => {
            if state.is_booked(participant) {
                return Err(SchedulerError::invalid_state(format!(
                    "Participant {} currently booked for this slot. \
                     To mark the participant unavailable, cancel the booking.",
                    participant.id
                )));
            }
            Ok(smallvec![BookingEvent::ParticipantUnmarkedAvailable {
                slot_id: slot_id.clone(),
                participant_id: participant.id.clone(),
                participant_type: participant.participant_type,
            }])
        }

        BookingCommand::BookReservation {
            student_id,
            aircraft_id,
            instructor_id,
            booking_id,
        } => {
            if !state.is_bookable(student_id, aircraft_id, instructor_id) {
                return Err(SchedulerError::invalid_state(
                    "Cannot book slot: one or more participants is unavailable.",
                ));
            }
            if !state.find_booking(booking_id).is_empty() {
                return Err(SchedulerError::invalid_state(
                    "Cannot book slot: booking id already in use",
                ));
            }

            let booked = |participant_id: &ParticipantId, participant_type| {
                BookingEvent::ParticipantBooked {
                    slot_id: slot_id.clone(),
                    participant_id: participant_id.clone(),
                    participant_type,
                    booking_id: booking_id.clone(),
                }
            };
            Ok(smallvec![
                booked(student_id, ParticipantType::Student),
                booked(instructor_id, ParticipantType::Instructor),
                booked(aircraft_id, ParticipantType::Aircraft),
            ])
        }

        BookingCommand::CancelBooking { booking_id } => {
            let mut rows = state.find_booking(booking_id);
            if rows.is_empty() {
                return Err(SchedulerError::invalid_state(format!(
                    "Cannot cancel booking {booking_id} as booking does not exist."
                )));
            }
            // Stable event order regardless of set iteration order.
            rows.sort_by(|a, b| a.participant.id.cmp(&b.participant.id));
            Ok(rows
                .into_iter()
                .map(|bk| BookingEvent::ParticipantCanceled {
                    slot_id: slot_id.clone(),
                    participant_id: bk.participant.id.clone(),
                    participant_type: bk.participant.participant_type,
                    booking_id: booking_id.clone(),
                })
                .collect())
        }
    }
}

/// Apply one event to the slot state.
///
/// Pure and total: deterministic given prior state and event, never fails,
/// never validates. This is the only place timeslot state changes.
pub fn apply(state: &mut Timeslot, event: &BookingEvent) {
    match event {
        BookingEvent::ParticipantMarkedAvailable { .. } => {
            state.reserve(event.participant());
        }
        BookingEvent::ParticipantUnmarkedAvailable { .. } => {
            state.unreserve(&event.participant());
        }
        BookingEvent::ParticipantBooked { booking_id, .. } => {
            state.book(event.participant(), booking_id.clone());
        }
        BookingEvent::ParticipantCanceled { booking_id, .. } => {
            state.cancel(&event.participant(), booking_id);
        }
    }
}

/// Rebuild slot state by folding an ordered event stream through [`apply`].
pub fn replay<'a>(events: impl IntoIterator<Item = &'a BookingEvent>) -> Timeslot {
    let mut state = Timeslot::new();
    for event in events {
        apply(&mut state, event);
    }
    state
}
