//! # Flight Slots Core
//!
//! Event-sourcing primitives for the flight-training slot scheduler.
//!
//! This crate provides the abstractions the booking engine is built on:
//!
//! - **Slot stream identity**: [`stream::SlotId`] and [`stream::Version`] —
//!   every timeslot owns one ordered event stream, versioned for optimistic
//!   concurrency.
//! - **Events**: [`event::Event`] and [`event::SerializedEvent`] — immutable
//!   facts, serialized with `bincode` and tagged with a stable discriminator
//!   string for forward/backward compatible storage.
//! - **Event store**: [`event_store::EventStore`] — append-only, per-slot
//!   ordered persistence with all-or-nothing batch appends.
//! - **Projections**: [`projection::Projection`] — read models derived by
//!   consuming the event stream, eventually consistent with the aggregates.
//!
//! The domain itself (the booking slot aggregate and the participant status
//! projection) lives in the `flight-slots-scheduler` crate; an in-memory
//! event store for tests lives in `flight-slots-testing`.

pub mod event;
pub mod event_store;
pub mod projection;
pub mod stream;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use serde::{Deserialize, Serialize};
