//! Hardware abstraction layer for the lockbox compartment controller.
//!
//! This crate provides trait-based abstractions for the peripherals the
//! controller core consumes: digital output and input lines, the keypad
//! scanner, a time source, the display and the telemetry transport. The traits
//! make it easy to substitute mock implementations (for development and
//! testing) for real drivers.
//!
//! # Design Philosophy
//!
//! - **Narrow**: each trait is the smallest interface the core needs. Pixel
//!   rendering, matrix scanning and telemetry transports stay behind them.
//! - **Synchronous**: the core runs one cooperative tick at a time, so every
//!   call completes (or fails) within the tick.
//! - **Error-aware**: fallible operations return [`Result<T>`] with
//!   [`HardwareError`] describing which line or device failed.
//!
//! # Example
//!
//! ```
//! use lockbox_core::{Level, LineId, LockPosition};
//! use lockbox_hardware::mock::MockGpio;
//! use lockbox_hardware::traits::DigitalInput;
//! use lockbox_hardware::Result;
//!
//! fn read_lock<I: DigitalInput>(input: &mut I, line: LineId) -> Result<LockPosition> {
//!     Ok(LockPosition::from_level(input.get_input(line)?))
//! }
//!
//! let mut gpio = MockGpio::new();
//! gpio.set_input(LineId::new(27), Level::High);
//! assert_eq!(read_lock(&mut gpio, LineId::new(27)).unwrap(), LockPosition::Open);
//! ```
//!
//! # Mock Implementations
//!
//! The [`mock`] module contains a GPIO bank with fault injection, a
//! channel-fed keypad, a manually advanced clock and recording sinks.

pub mod error;
pub mod mock;
pub mod traits;
pub mod types;

// Re-export commonly used types for convenience
pub use error::{HardwareError, Result};
pub use traits::{
    Clock, DigitalInput, DigitalOutput, KeypadSource, PresentationSink, SystemClock, TelemetrySink,
};
pub use types::{TelemetryEvent, TelemetryKind};
