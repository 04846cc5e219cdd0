//! Mock device implementations for testing and development.
//!
//! This module provides simulated devices that can be controlled
//! programmatically without requiring physical hardware. Every mock is cheap
//! to clone and clones share state, so a test can hand one copy to the
//! controller and keep another to drive inputs and inspect outputs.

pub mod clock;
pub mod gpio;
pub mod keypad;
pub mod sinks;

// Re-export commonly used types
pub use clock::ManualClock;
pub use gpio::{MAX_RECORDED_WRITES, MockGpio, WriteRecord};
pub use keypad::{MockKeypad, MockKeypadHandle};
pub use sinks::{RecordingPresentation, RecordingTelemetry};
