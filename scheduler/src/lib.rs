//! Event-sourced booking engine for flight-training timeslots.
//!
//! A training session requires three participants — a student, an aircraft
//! and an instructor — to be simultaneously available for one timeslot.
//! Participants declare availability per slot; a booking atomically claims
//! all three; cancellation releases the claim without restoring
//! availability.
//!
//! The crate is split along the command/query seam:
//!
//! - [`aggregate`] holds the pure decision logic: commands are validated
//!   against the slot's current [`types::Timeslot`] state and either
//!   rejected or turned into a batch of [`events::BookingEvent`]s.
//! - [`scheduler`] is the runtime: [`scheduler::SlotScheduler`] serializes
//!   commands per slot, persists event batches to an
//!   [`EventStore`](flight_slots_core::event_store::EventStore), and fans
//!   persisted events out to subscribers.
//! - [`projection`] is the query side: an eventually consistent
//!   participant-status table answering "where does participant P stand,
//!   across all slots?".
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(InMemoryEventStore::new());
//! let scheduler = SlotScheduler::new(store);
//! let index = ParticipantSlotIndex::spawn(scheduler.subscribe());
//!
//! let slot = SlotId::new("2026-09-01T09:00");
//! scheduler
//!     .invoke(&slot, BookingCommand::MarkAvailable {
//!         participant: Participant::new("alice", ParticipantType::Student),
//!     })
//!     .await?;
//! ```

pub mod aggregate;
pub mod error;
pub mod events;
pub mod projection;
pub mod scheduler;
pub mod types;

pub use aggregate::{BookingCommand, EventBatch, apply, decide, replay};
pub use error::SchedulerError;
pub use events::BookingEvent;
pub use projection::{ParticipantSlotIndex, ParticipantSlotsProjection, SlotRow};
pub use scheduler::SlotScheduler;
pub use types::{
    Booking, BookingId, Participant, ParticipantId, ParticipantType, SlotStatus, SlotView,
    Timeslot,
};

pub use flight_slots_core::stream::{SlotId, Version};
