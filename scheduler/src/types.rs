//! Domain value types for the slot booking engine.
//!
//! A flight-training session needs three distinct participants — a student,
//! an aircraft and an instructor — to be simultaneously available for one
//! timeslot. The types here model that domain: [`Participant`] identities,
//! confirmed [`Booking`]s, and the per-slot [`Timeslot`] state the aggregate
//! owns.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier for a participant, unique within its participant type.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create a new `ParticipantId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Caller-supplied identifier grouping the bookings created by one booking
/// command.
///
/// One successful `BookReservation` produces three bookings — student,
/// aircraft, instructor — all carrying the same `BookingId`. The id must be
/// unique within a timeslot while the booking is active.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BookingId(String);

impl BookingId {
    /// Create a new `BookingId`.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BookingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for BookingId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Error returned when a participant type string cannot be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid participant type: {0}")]
pub struct ParseParticipantTypeError(String);

/// The role a participant plays in a training session.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantType {
    /// The student taking the lesson.
    Student,
    /// The instructor giving the lesson.
    Instructor,
    /// The aircraft used for the lesson.
    Aircraft,
}

impl fmt::Display for ParticipantType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Student => "STUDENT",
            Self::Instructor => "INSTRUCTOR",
            Self::Aircraft => "AIRCRAFT",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ParticipantType {
    type Err = ParseParticipantTypeError;

    /// Parses case-insensitively, ignoring surrounding whitespace, so the
    /// request-level spellings `"student"` and `" AIRCRAFT "` both work.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "STUDENT" => Ok(Self::Student),
            "INSTRUCTOR" => Ok(Self::Instructor),
            "AIRCRAFT" => Ok(Self::Aircraft),
            _ => Err(ParseParticipantTypeError(s.to_string())),
        }
    }
}

/// A participant identity: id plus role. Equality is over both fields, so
/// `alice` the student and `alice` the instructor are distinct participants.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Participant {
    /// Participant identifier, unique within its type.
    pub id: ParticipantId,
    /// The participant's role.
    pub participant_type: ParticipantType,
}

impl Participant {
    /// Create a new `Participant`.
    #[must_use]
    pub fn new(id: impl Into<ParticipantId>, participant_type: ParticipantType) -> Self {
        Self {
            id: id.into(),
            participant_type,
        }
    }
}

impl fmt::Display for Participant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.participant_type)
    }
}

/// A confirmed booking row: one participant bound under one booking id.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Booking {
    /// The booked participant.
    pub participant: Participant,
    /// The booking this participant belongs to.
    pub booking_id: BookingId,
}

impl Booking {
    /// Create a new `Booking`.
    #[must_use]
    pub const fn new(participant: Participant, booking_id: BookingId) -> Self {
        Self {
            participant,
            booking_id,
        }
    }
}

/// Error returned when a status string is neither `available` nor `booked`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid slot status: {0} (must be one of available, booked)")]
pub struct ParseSlotStatusError(String);

/// Status of a participant within a slot, as exposed by the read model.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotStatus {
    /// The participant has declared availability for the slot.
    Available,
    /// The participant is part of a confirmed booking for the slot.
    Booked,
}

impl fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Available => "available",
            Self::Booked => "booked",
        };
        write!(f, "{s}")
    }
}

impl FromStr for SlotStatus {
    type Err = ParseSlotStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(Self::Available),
            "booked" => Ok(Self::Booked),
            _ => Err(ParseSlotStatusError(s.to_string())),
        }
    }
}

/// The state of one timeslot: who is available, who is booked.
///
/// This is the aggregate state. It is only ever mutated by applying
/// [`BookingEvent`](crate::events::BookingEvent)s; commands validate against
/// it but never touch it directly.
///
/// Invariants maintained by event application:
///
/// - A participant in `bookings` is never simultaneously in `available`
///   (booking consumes availability).
/// - At most one booking exists per (participant, booking id) pair.
/// - No two bookings share a participant unless they share a booking id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeslot {
    available: HashSet<Participant>,
    bookings: HashSet<Booking>,
}

impl Timeslot {
    /// Create an empty timeslot (no availability, no bookings).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Participants currently declared available for this slot.
    #[must_use]
    pub const fn available(&self) -> &HashSet<Participant> {
        &self.available
    }

    /// Bookings currently confirmed for this slot.
    #[must_use]
    pub const fn bookings(&self) -> &HashSet<Booking> {
        &self.bookings
    }

    /// Whether the participant is part of any active booking.
    #[must_use]
    pub fn is_booked(&self, participant: &Participant) -> bool {
        self.bookings.iter().any(|bk| bk.participant == *participant)
    }

    /// Whether all three named participants are currently available in their
    /// required roles.
    #[must_use]
    pub fn is_bookable(
        &self,
        student_id: &ParticipantId,
        aircraft_id: &ParticipantId,
        instructor_id: &ParticipantId,
    ) -> bool {
        self.available
            .contains(&Participant::new(student_id.clone(), ParticipantType::Student))
            && self
                .available
                .contains(&Participant::new(aircraft_id.clone(), ParticipantType::Aircraft))
            && self.available.contains(&Participant::new(
                instructor_id.clone(),
                ParticipantType::Instructor,
            ))
    }

    /// All bookings carrying the given booking id.
    #[must_use]
    pub fn find_booking(&self, booking_id: &BookingId) -> Vec<&Booking> {
        self.bookings
            .iter()
            .filter(|bk| bk.booking_id == *booking_id)
            .collect()
    }

    /// Deterministically ordered view of this slot, for external callers.
    ///
    /// `available` is sorted by participant id; `bookings` by booking id,
    /// then participant id. The raw aggregate state uses unordered sets, so
    /// anything that leaves the process goes through this.
    #[must_use]
    pub fn to_view(&self) -> SlotView {
        let mut available: Vec<Participant> = self.available.iter().cloned().collect();
        available.sort_by(|a, b| a.id.cmp(&b.id));

        let mut bookings: Vec<Booking> = self.bookings.iter().cloned().collect();
        bookings.sort_by(|a, b| {
            a.booking_id
                .cmp(&b.booking_id)
                .then_with(|| a.participant.id.cmp(&b.participant.id))
        });

        SlotView {
            available,
            bookings,
        }
    }

    /// Add a participant to the available set. Re-adding is a no-op.
    pub(crate) fn reserve(&mut self, participant: Participant) {
        self.available.insert(participant);
    }

    /// Remove a participant from the available set. Removing a non-member is
    /// a no-op.
    pub(crate) fn unreserve(&mut self, participant: &Participant) {
        self.available.remove(participant);
    }

    /// Record a booking: consumes the participant's availability and adds the
    /// booking row.
    pub(crate) fn book(&mut self, participant: Participant, booking_id: BookingId) {
        self.available.remove(&participant);
        self.bookings.insert(Booking::new(participant, booking_id));
    }

    /// Remove one participant's booking row. Availability is not restored;
    /// the participant must be explicitly re-marked available.
    pub(crate) fn cancel(&mut self, participant: &Participant, booking_id: &BookingId) {
        self.bookings
            .retain(|bk| !(bk.participant == *participant && bk.booking_id == *booking_id));
    }
}

/// A deterministically ordered snapshot of one slot's state.
///
/// Produced by [`Timeslot::to_view`]; suitable for serialization to external
/// callers where stable ordering matters.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotView {
    /// Available participants, sorted by participant id.
    pub available: Vec<Participant>,
    /// Confirmed bookings, sorted by booking id then participant id.
    pub bookings: Vec<Booking>,
}
