//! Error types for hardware operations.
//!
//! This module defines the error type returned by every collaborator the
//! controller core talks to: digital I/O lines, the keypad, the display and
//! the telemetry transport.

use lockbox_core::LineId;

/// Result type alias for hardware operations.
pub type Result<T> = std::result::Result<T, HardwareError>;

/// Errors that can occur during hardware device operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HardwareError {
    /// Reading or writing a digital line failed.
    #[error("I/O fault on {line}: {message}")]
    IoFault { line: LineId, message: String },

    /// Device is not connected or has been disconnected.
    #[error("Device disconnected: {device}")]
    Disconnected { device: String },

    /// Device communication error.
    #[error("Communication error: {message}")]
    CommunicationError { message: String },

    /// Generic error with custom message.
    #[error("{0}")]
    Other(String),
}

impl HardwareError {
    /// Create a new digital I/O fault.
    pub fn io_fault(line: LineId, message: impl Into<String>) -> Self {
        Self::IoFault {
            line,
            message: message.into(),
        }
    }

    /// Create a new disconnected error.
    pub fn disconnected(device: impl Into<String>) -> Self {
        Self::Disconnected {
            device: device.into(),
        }
    }

    /// Create a new communication error.
    pub fn communication(message: impl Into<String>) -> Self {
        Self::CommunicationError {
            message: message.into(),
        }
    }

    /// Create a generic error with custom message.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_fault_error() {
        let error = HardwareError::io_fault(LineId::new(27), "read failed");
        assert!(matches!(error, HardwareError::IoFault { .. }));
        assert_eq!(error.to_string(), "I/O fault on GPIO27: read failed");
    }

    #[test]
    fn test_disconnected_error() {
        let error = HardwareError::disconnected("Keypad");
        assert_eq!(error.to_string(), "Device disconnected: Keypad");
    }

    #[test]
    fn test_communication_error() {
        let error = HardwareError::communication("SPI bus busy");
        assert!(matches!(error, HardwareError::CommunicationError { .. }));
        assert_eq!(error.to_string(), "Communication error: SPI bus busy");
    }

    #[test]
    fn test_error_display() {
        let errors = vec![
            HardwareError::io_fault(LineId::new(0), "write failed"),
            HardwareError::disconnected("Display"),
            HardwareError::other("telemetry queue full"),
        ];

        for error in errors {
            let _ = format!("{}", error);
            let _ = format!("{:?}", error);
        }
    }
}
