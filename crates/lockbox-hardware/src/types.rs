//! Types shared between the controller core and its sinks.
//!
//! This module defines the telemetry event record emitted on security-relevant
//! lock activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kinds of security-relevant events the controller reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum TelemetryKind {
    /// Lock reopened from the closed screen without a new code.
    Reopened,

    /// Lock opened so an item can be stored; a new code was committed.
    OpenedToStore,

    /// Lock opened with the matching code so the item can be picked up.
    OpenedToRetrieve,

    /// Sensor reported the lock closed after it was open.
    Closed,

    /// Alert button pressed while the lock was not being opened.
    Alert,
}

impl TelemetryKind {
    /// Event name as reported to the telemetry backend.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reopened | Self::OpenedToStore | Self::OpenedToRetrieve => "LockOpened",
            Self::Closed => "LockClosed",
            Self::Alert => "ButtonPress",
        }
    }

    /// Human-readable message accompanying the event.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Reopened => "Lock reopened.",
            Self::OpenedToStore => "Lock opened to store item.",
            Self::OpenedToRetrieve => "Lock opened to pick up item.",
            Self::Closed => "Lock is now closed.",
            Self::Alert => "Alert! Button pressed while locked.",
        }
    }
}

/// A single telemetry event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// What happened.
    pub kind: TelemetryKind,

    /// Event name (e.g., "LockOpened").
    pub name: String,

    /// Event message (e.g., "Lock opened to store item.").
    pub message: String,

    /// Wall-clock time the event was raised.
    pub timestamp: DateTime<Utc>,
}

impl TelemetryEvent {
    /// Create an event of the given kind stamped with the current time.
    pub fn new(kind: TelemetryKind) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            message: kind.message().to_string(),
            timestamp: Utc::now(),
        }
    }
}
