//! Property tests: no command sequence, however adversarial, can drive a
//! timeslot into a state that violates its booking invariants.

#![allow(clippy::unwrap_used)]

use flight_slots_scheduler::{
    BookingCommand, BookingEvent, BookingId, Participant, ParticipantId, ParticipantType, SlotId,
    Timeslot, apply, decide, replay,
};
use proptest::prelude::*;
use std::collections::HashMap;

const STUDENTS: [&str; 3] = ["alice", "bob", "carol"];
const AIRCRAFT: [&str; 3] = ["superplane", "glider", "jet"];
const INSTRUCTORS: [&str; 3] = ["superteacher", "mentor", "coach"];
const BOOKING_IDS: [&str; 4] = ["b1", "b2", "b3", "b4"];

fn participant_strategy() -> impl Strategy<Value = Participant> {
    prop_oneof![
        proptest::sample::select(&STUDENTS[..])
            .prop_map(|id| Participant::new(id, ParticipantType::Student)),
        proptest::sample::select(&AIRCRAFT[..])
            .prop_map(|id| Participant::new(id, ParticipantType::Aircraft)),
        proptest::sample::select(&INSTRUCTORS[..])
            .prop_map(|id| Participant::new(id, ParticipantType::Instructor)),
    ]
}

fn command_strategy() -> impl Strategy<Value = BookingCommand> {
    prop_oneof![
        participant_strategy().prop_map(|participant| BookingCommand::MarkAvailable { participant }),
        participant_strategy()
            .prop_map(|participant| BookingCommand::UnmarkAvailable { participant }),
        (
            proptest::sample::select(&STUDENTS[..]),
            proptest::sample::select(&AIRCRAFT[..]),
            proptest::sample::select(&INSTRUCTORS[..]),
            proptest::sample::select(&BOOKING_IDS[..]),
        )
            .prop_map(|(student, aircraft, instructor, booking)| {
                BookingCommand::BookReservation {
                    student_id: ParticipantId::new(student),
                    aircraft_id: ParticipantId::new(aircraft),
                    instructor_id: ParticipantId::new(instructor),
                    booking_id: BookingId::new(booking),
                }
            }),
        proptest::sample::select(&BOOKING_IDS[..]).prop_map(|booking| {
            BookingCommand::CancelBooking {
                booking_id: BookingId::new(booking),
            }
        }),
    ]
}

/// No participant is simultaneously available and booked.
fn assert_no_dual_membership(state: &Timeslot) {
    for booking in state.bookings() {
        assert!(
            !state.available().contains(&booking.participant),
            "participant {} is both available and booked",
            booking.participant
        );
    }
}

/// No participant belongs to two bookings with different booking ids.
fn assert_one_booking_per_participant(state: &Timeslot) {
    let mut seen: HashMap<&Participant, &BookingId> = HashMap::new();
    for booking in state.bookings() {
        if let Some(existing) = seen.insert(&booking.participant, &booking.booking_id) {
            assert_eq!(
                existing, &booking.booking_id,
                "participant {} is double-booked under two ids",
                booking.participant
            );
        }
    }
}

proptest! {
    /// Fold arbitrary command sequences through the aggregate; rejected
    /// commands are skipped, accepted ones are applied. The invariants must
    /// hold after every single event application, not just at the end.
    #[test]
    fn command_sequences_preserve_invariants(
        commands in proptest::collection::vec(command_strategy(), 0..60)
    ) {
        let slot = SlotId::new("propslot");
        let mut state = Timeslot::new();
        let mut history: Vec<BookingEvent> = Vec::new();

        for command in &commands {
            let Ok(events) = decide(&state, &slot, command) else {
                continue;
            };
            for event in &events {
                apply(&mut state, event);
                assert_no_dual_membership(&state);
                assert_one_booking_per_participant(&state);
            }
            history.extend(events);
        }

        // Replay of the surviving history reproduces the final state.
        prop_assert_eq!(replay(&history), state);
    }

    /// A booking command yields exactly three events or none at all.
    #[test]
    fn bookings_are_all_or_nothing(
        setup in proptest::collection::vec(command_strategy(), 0..30),
        student in proptest::sample::select(&STUDENTS[..]),
        aircraft in proptest::sample::select(&AIRCRAFT[..]),
        instructor in proptest::sample::select(&INSTRUCTORS[..]),
    ) {
        let slot = SlotId::new("propslot");
        let mut state = Timeslot::new();
        for command in &setup {
            if let Ok(events) = decide(&state, &slot, command) {
                for event in &events {
                    apply(&mut state, event);
                }
            }
        }

        let book = BookingCommand::BookReservation {
            student_id: ParticipantId::new(student),
            aircraft_id: ParticipantId::new(aircraft),
            instructor_id: ParticipantId::new(instructor),
            booking_id: BookingId::new("fresh-booking"),
        };
        match decide(&state, &slot, &book) {
            Ok(events) => {
                prop_assert_eq!(events.len(), 3);
                let shared: std::collections::HashSet<_> =
                    events.iter().filter_map(BookingEvent::booking_id).collect();
                prop_assert_eq!(shared.len(), 1);
            }
            Err(err) => {
                // Rejection is clean: the state is untouched and the reason
                // is one of the two booking rules.
                let reason = err.to_string();
                prop_assert!(
                    reason == "Cannot book slot: one or more participants is unavailable."
                        || reason == "Cannot book slot: booking id already in use"
                );
            }
        }
    }

    /// Canceling an existing booking always removes every row carrying the
    /// id and never touches availability.
    #[test]
    fn cancellation_removes_whole_booking(
        setup in proptest::collection::vec(command_strategy(), 0..40),
        booking in proptest::sample::select(&BOOKING_IDS[..]),
    ) {
        let slot = SlotId::new("propslot");
        let mut state = Timeslot::new();
        for command in &setup {
            if let Ok(events) = decide(&state, &slot, command) {
                for event in &events {
                    apply(&mut state, event);
                }
            }
        }

        let booking_id = BookingId::new(booking);
        let available_before = state.available().clone();
        let cancel = BookingCommand::CancelBooking { booking_id: booking_id.clone() };

        if let Ok(events) = decide(&state, &slot, &cancel) {
            prop_assert!(!events.is_empty());
            for event in &events {
                apply(&mut state, event);
            }
            prop_assert!(state.find_booking(&booking_id).is_empty());
            prop_assert_eq!(state.available(), &available_before);
        } else {
            prop_assert!(state.find_booking(&booking_id).is_empty());
        }
    }
}
