//! Faults surfaced by the controller core.

use lockbox_core::AccessState;
use lockbox_hardware::HardwareError;
use thiserror::Error;

/// Faults that abort the current tick.
///
/// None of these are retried inside the core; the driver simply calls `tick`
/// again on its next cycle.
#[derive(Debug, Error)]
pub enum CoreFault {
    /// Reading the lock sensor failed. The session was left untouched.
    #[error("I/O fault: {0}")]
    Io(#[source] HardwareError),

    /// A write failed part-way through the unlock pulse sequence. The
    /// controller stays in `Actuating` and reruns the sequence next tick.
    #[error("Actuator fault: {0}")]
    Actuator(#[source] HardwareError),

    /// The transition table was violated. Indicates a bug.
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: AccessState, to: AccessState },

    /// The controller was built with an unusable configuration.
    #[error("Configuration error: {0}")]
    Config(#[from] lockbox_core::Error),
}

impl CoreFault {
    /// Whether retrying on the next tick can succeed without intervention.
    pub fn is_transient(&self) -> bool {
        matches!(self, CoreFault::Io(_) | CoreFault::Actuator(_))
    }
}
