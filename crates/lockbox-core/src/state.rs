//! Access states of the compartment controller and the read-only snapshot
//! handed to presentation sinks.
//!
//! # Valid Transitions
//!
//! - Idle → EnteringCode → Actuating/InvalidCode
//! - EnteringCode → Idle (back)
//! - Actuating → Open → Closed → Idle
//! - Closed → Actuating (reopen)
//! - InvalidCode → EnteringCode/LockedOut
//! - LockedOut → Idle

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LockPosition;

/// Every state of the access-control flow. Exactly one is current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    /// Showing whether the compartment is empty or occupied; waiting for the menu key.
    #[default]
    Idle,

    /// Collecting the six-digit code.
    EnteringCode,

    /// Running the unlock pulse sequence, then waiting for the sensor to report open.
    Actuating,

    /// Lock is physically open.
    Open,

    /// Lock was closed again; user may finish or reopen.
    Closed,

    /// A mismatched code was confirmed; held for the display delay.
    InvalidCode,

    /// Too many mismatches; code entry barred for the lockout delay.
    LockedOut,
}

impl fmt::Display for AccessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state_str = match self {
            AccessState::Idle => "Idle",
            AccessState::EnteringCode => "EnteringCode",
            AccessState::Actuating => "Actuating",
            AccessState::Open => "Open",
            AccessState::Closed => "Closed",
            AccessState::InvalidCode => "InvalidCode",
            AccessState::LockedOut => "LockedOut",
        };
        write!(f, "{}", state_str)
    }
}

impl AccessState {
    /// Check if transition to target state is valid from this state.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockbox_core::AccessState;
    ///
    /// assert!(AccessState::Idle.can_transition_to(&AccessState::EnteringCode));
    /// assert!(!AccessState::LockedOut.can_transition_to(&AccessState::EnteringCode));
    /// ```
    pub fn can_transition_to(&self, target: &AccessState) -> bool {
        matches!(
            (self, target),
            // From Idle
            (AccessState::Idle, AccessState::EnteringCode)
            // From EnteringCode
            | (AccessState::EnteringCode, AccessState::Idle | AccessState::Actuating | AccessState::InvalidCode)
            // From Actuating
            | (AccessState::Actuating, AccessState::Open)
            // From Open
            | (AccessState::Open, AccessState::Closed)
            // From Closed
            | (AccessState::Closed, AccessState::Idle | AccessState::Actuating)
            // From InvalidCode
            | (AccessState::InvalidCode, AccessState::EnteringCode | AccessState::LockedOut)
            // From LockedOut
            | (AccessState::LockedOut, AccessState::Idle)
        )
    }

    /// States that advance on their own once a timed window has elapsed.
    pub fn is_auto_advancing(&self) -> bool {
        matches!(self, AccessState::InvalidCode | AccessState::LockedOut)
    }

    /// States in which the alert button does not raise an alert, because the
    /// lock is legitimately being opened.
    pub fn suppresses_alert(&self) -> bool {
        matches!(self, AccessState::Actuating | AccessState::Open)
    }
}

/// What the user set out to do when they started entering a code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Compartment was empty; the code being entered will lock an item in.
    Store,
    /// Compartment was occupied; the code being entered must match.
    Retrieve,
}

impl OperationKind {
    pub fn for_occupancy(occupied: bool) -> Self {
        if occupied {
            OperationKind::Retrieve
        } else {
            OperationKind::Store
        }
    }
}

/// Read-only view of the session for presentation.
///
/// Carries only the length of the pending code, never its digits, and
/// nothing about the committed code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: AccessState,
    pub occupied: bool,
    pub operation: Option<OperationKind>,
    pub pending_len: usize,
    pub failed_attempts: u8,
    pub reopen_requested: bool,
    pub sensor_position: LockPosition,
}
