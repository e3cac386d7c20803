//! Slot stream identification and versioning types.
//!
//! Each timeslot is an aggregate with its own append-only event stream. The
//! [`SlotId`] names that stream; the [`Version`] tracks how many events it
//! holds, which is what optimistic concurrency checks compare against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error type for `SlotId` parsing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid slot ID: {0}")]
pub struct ParseSlotIdError(String);

/// Unique identifier for a timeslot's event stream.
///
/// The slot identifier is an opaque, caller-supplied string — typically it
/// encodes a date/hour/resource combination such as `"2025-06-01T09-runway2"`,
/// but the engine never looks inside it. All commands addressed to the same
/// `SlotId` are serialized against the same aggregate instance.
///
/// # Validation
///
/// - `FromStr::from_str()`: validates input (rejects empty strings)
/// - `From::from()` and `new()`: no validation (for application-controlled data)
///
/// Use `FromStr` when parsing external input; use `new()` or `From` when the
/// identifier is already trusted.
///
/// # Examples
///
/// ```
/// use flight_slots_core::stream::SlotId;
///
/// let slot = SlotId::new("bestslot");
/// assert_eq!(slot.as_str(), "bestslot");
///
/// let parsed: SlotId = "worstslot".parse().unwrap();
/// assert_eq!(parsed, SlotId::new("worstslot"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SlotId(String);

impl SlotId {
    /// Create a new `SlotId` from a string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the slot ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert the `SlotId` into its inner `String`.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SlotId {
    type Err = ParseSlotIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(ParseSlotIdError("Slot ID cannot be empty".to_string()));
        }
        Ok(Self(s.to_string()))
    }
}

impl From<String> for SlotId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SlotId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl AsRef<str> for SlotId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Event version number for optimistic concurrency control.
///
/// A stream at version `n` holds `n` events. When appending, the writer
/// states the version it believes the stream is at; a mismatch means another
/// writer got there first and the append is rejected without side effects.
///
/// # Examples
///
/// ```
/// use flight_slots_core::stream::Version;
///
/// let v0 = Version::INITIAL;
/// assert_eq!(v0.next(), Version::new(1));
/// assert_eq!(Version::new(5).value(), 5);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// The initial version (0) for a new event stream.
    pub const INITIAL: Self = Self(0);

    /// Create a new `Version` with the given value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Get the version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Get the next version (current + 1).
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Check if this is the initial version (0).
    #[must_use]
    pub const fn is_initial(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl std::ops::Add<u64> for Version {
    type Output = Self;

    fn add(self, rhs: u64) -> Self::Output {
        Self(self.0 + rhs)
    }
}
