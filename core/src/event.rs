//! Event trait and wire format for the slot booking engine.
//!
//! Events are immutable facts: a participant was marked available, a booking
//! was made. They are the only mechanism through which timeslot state changes,
//! and replaying them rebuilds that state deterministically.
//!
//! Events are serialized with `bincode` for storage; each serialized record
//! carries a stable discriminator string (the event "kind") so stored events
//! stay readable across schema evolution.

use serde::{Serialize, de::DeserializeOwned};
use std::fmt;
use thiserror::Error;

/// Error types for event serialization.
#[derive(Error, Debug)]
pub enum EventError {
    /// Failed to serialize event to bytes.
    #[error("Failed to serialize event: {0}")]
    SerializationError(String),

    /// Failed to deserialize event from bytes.
    #[error("Failed to deserialize event: {0}")]
    DeserializationError(String),

    /// Unknown event type encountered during deserialization.
    #[error("Unknown event type: {0}")]
    UnknownEventType(String),
}

/// An event that can be stored in an event store and replayed to reconstruct
/// state.
///
/// # Event Naming Convention
///
/// `event_type()` returns a stable string identifier with a version suffix,
/// e.g. `"ParticipantBooked.v1"`. The identifier is stored alongside the
/// serialized payload and must never change for an existing schema; a schema
/// change bumps the suffix instead.
///
/// # Examples
///
/// ```
/// use flight_slots_core::event::Event;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Clone, Debug, Serialize, Deserialize)]
/// enum SlotEvent {
///     Opened { slot_id: String },
/// }
///
/// impl Event for SlotEvent {
///     fn event_type(&self) -> &'static str {
///         match self {
///             SlotEvent::Opened { .. } => "Opened.v1",
///         }
///     }
/// }
/// ```
pub trait Event: Send + Sync + 'static {
    /// Returns the stable event type identifier for this event.
    fn event_type(&self) -> &'static str;

    /// Serialize this event to bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::SerializationError`] if the event cannot be
    /// serialized.
    fn to_bytes(&self) -> Result<Vec<u8>, EventError>
    where
        Self: Serialize,
    {
        bincode::serialize(self).map_err(|e| EventError::SerializationError(e.to_string()))
    }

    /// Deserialize an event from bincode bytes.
    ///
    /// # Errors
    ///
    /// Returns [`EventError::DeserializationError`] if the bytes do not decode
    /// into this event type (corruption, wrong type, incompatible schema).
    fn from_bytes(bytes: &[u8]) -> Result<Self, EventError>
    where
        Self: DeserializeOwned + Sized,
    {
        bincode::deserialize(bytes).map_err(|e| EventError::DeserializationError(e.to_string()))
    }
}

/// A serialized event ready for storage.
///
/// Wire format between the aggregate and the event store: the stable event
/// type discriminator, the bincode payload, and optional JSON metadata
/// (timestamps, correlation ids, the originating slot).
#[derive(Clone, Debug)]
pub struct SerializedEvent {
    /// The event type identifier (e.g., `"ParticipantBooked.v1"`).
    pub event_type: String,

    /// The bincode-serialized event data.
    pub data: Vec<u8>,

    /// Optional metadata in JSON format.
    pub metadata: Option<serde_json::Value>,
}

impl SerializedEvent {
    /// Create a new serialized event.
    #[must_use]
    pub const fn new(
        event_type: String,
        data: Vec<u8>,
        metadata: Option<serde_json::Value>,
    ) -> Self {
        Self {
            event_type,
            data,
            metadata,
        }
    }

    /// Create a serialized event from an [`Event`].
    ///
    /// # Errors
    ///
    /// Returns [`EventError::SerializationError`] if the event cannot be
    /// serialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use flight_slots_core::event::{Event, SerializedEvent};
    /// # use serde::{Serialize, Deserialize};
    /// # #[derive(Clone, Debug, Serialize, Deserialize)]
    /// # enum SlotEvent { Opened { slot_id: String } }
    /// # impl Event for SlotEvent {
    /// #     fn event_type(&self) -> &'static str { "Opened.v1" }
    /// # }
    ///
    /// let event = SlotEvent::Opened { slot_id: "bestslot".to_string() };
    /// let serialized = SerializedEvent::from_event(&event, None).unwrap();
    /// assert_eq!(serialized.event_type, "Opened.v1");
    /// ```
    pub fn from_event<E: Event + Serialize>(
        event: &E,
        metadata: Option<serde_json::Value>,
    ) -> Result<Self, EventError> {
        Ok(Self {
            event_type: event.event_type().to_string(),
            data: event.to_bytes()?,
            metadata,
        })
    }
}

impl fmt::Display for SerializedEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SerializedEvent {{ type: {}, size: {} bytes }}",
            self.event_type,
            self.data.len()
        )
    }
}
