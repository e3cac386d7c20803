//! Concurrency behavior of the per-slot single-writer scheduler.

#![allow(clippy::unwrap_used)]

use flight_slots_scheduler::{
    BookingCommand, BookingId, Participant, ParticipantId, ParticipantType, SlotId, SlotScheduler,
};
use flight_slots_testing::{FailingEventStore, InMemoryEventStore};
use std::sync::Arc;

async fn mark(scheduler: &SlotScheduler, slot: &SlotId, id: &str, kind: ParticipantType) {
    scheduler
        .invoke(
            slot,
            BookingCommand::MarkAvailable {
                participant: Participant::new(id, kind),
            },
        )
        .await
        .unwrap();
}

fn book(student: &str, aircraft: &str, instructor: &str, booking: &str) -> BookingCommand {
    BookingCommand::BookReservation {
        student_id: ParticipantId::new(student),
        aircraft_id: ParticipantId::new(aircraft),
        instructor_id: ParticipantId::new(instructor),
        booking_id: BookingId::new(booking),
    }
}

#[tokio::test]
async fn concurrent_bookings_for_one_trio_admit_exactly_one() {
    let scheduler = Arc::new(SlotScheduler::new(Arc::new(InMemoryEventStore::new())));
    let slot = SlotId::new("2026-09-01T09:00");

    mark(&scheduler, &slot, "alice", ParticipantType::Student).await;
    mark(&scheduler, &slot, "superplane", ParticipantType::Aircraft).await;
    mark(&scheduler, &slot, "superteacher", ParticipantType::Instructor).await;

    // Twenty racing bookings of the same three participants, distinct ids.
    // Single-writer serialization must admit exactly one.
    let mut tasks = Vec::new();
    for n in 0..20 {
        let scheduler = Arc::clone(&scheduler);
        let slot = slot.clone();
        tasks.push(tokio::spawn(async move {
            scheduler
                .invoke(
                    &slot,
                    book(
                        "alice",
                        "superplane",
                        "superteacher",
                        &format!("booking{n}"),
                    ),
                )
                .await
        }));
    }

    let mut successes = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);

    let state = scheduler.get_slot(&slot).await.unwrap();
    assert_eq!(state.bookings().len(), 3);
    // All three rows share the single winning booking id.
    let ids: std::collections::HashSet<_> = state
        .bookings()
        .iter()
        .map(|bk| bk.booking_id.clone())
        .collect();
    assert_eq!(ids.len(), 1);
}

#[tokio::test]
async fn slots_do_not_contend_with_each_other() {
    let scheduler = Arc::new(SlotScheduler::new(Arc::new(InMemoryEventStore::new())));

    // The same trio books successfully in every slot: availability and
    // bookings are strictly per-slot state.
    let mut tasks = Vec::new();
    for n in 0..10 {
        let scheduler = Arc::clone(&scheduler);
        tasks.push(tokio::spawn(async move {
            let slot = SlotId::new(format!("slot{n}"));
            mark(&scheduler, &slot, "alice", ParticipantType::Student).await;
            mark(&scheduler, &slot, "superplane", ParticipantType::Aircraft).await;
            mark(&scheduler, &slot, "superteacher", ParticipantType::Instructor).await;
            scheduler
                .invoke(&slot, book("alice", "superplane", "superteacher", "booking1"))
                .await
        }));
    }

    for task in tasks {
        task.await.unwrap().unwrap();
    }

    for n in 0..10 {
        let state = scheduler
            .get_slot(&SlotId::new(format!("slot{n}")))
            .await
            .unwrap();
        assert_eq!(state.bookings().len(), 3);
    }
}

#[tokio::test]
async fn append_failure_leaves_state_unchanged() {
    let scheduler = SlotScheduler::new(Arc::new(FailingEventStore::new()));
    let slot = SlotId::new("2026-09-01T09:00");

    let err = scheduler
        .invoke(
            &slot,
            BookingCommand::MarkAvailable {
                participant: Participant::new("alice", ParticipantType::Student),
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_retryable());

    // The failed command applied nothing.
    let state = scheduler.get_slot(&slot).await.unwrap();
    assert!(state.available().is_empty());
    assert!(state.bookings().is_empty());
}

#[tokio::test]
async fn two_schedulers_over_one_store_rehydrate_identically() {
    let store: Arc<InMemoryEventStore> = Arc::new(InMemoryEventStore::new());
    let slot = SlotId::new("2026-09-01T09:00");

    let writer = SlotScheduler::new(store.clone());
    mark(&writer, &slot, "alice", ParticipantType::Student).await;
    mark(&writer, &slot, "superplane", ParticipantType::Aircraft).await;
    mark(&writer, &slot, "superteacher", ParticipantType::Instructor).await;
    writer
        .invoke(&slot, book("alice", "superplane", "superteacher", "booking1"))
        .await
        .unwrap();

    let reader = SlotScheduler::new(store);
    let original = writer.get_slot(&slot).await.unwrap();
    let replayed = reader.get_slot(&slot).await.unwrap();
    assert_eq!(original, replayed);
}
