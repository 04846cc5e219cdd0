//! Hardware device trait definitions.
//!
//! This module defines the narrow interfaces between the controller core and
//! the peripherals it drives: digital lines, the keypad scanner, a time source,
//! the display and the telemetry transport.
//!
//! Unlike a networked peripheral, everything here is polled from a single
//! cooperative tick loop, so the traits are synchronous. A call either
//! completes within the tick or fails; nothing is suspended across ticks.

use std::time::{Duration, Instant};

use lockbox_core::{Level, LineId, RawKey, SessionSnapshot};

use crate::error::Result;
use crate::types::TelemetryEvent;

/// A bank of digital output lines.
///
/// # Examples
///
/// ```
/// use lockbox_core::{Level, LineId};
/// use lockbox_hardware::traits::DigitalOutput;
/// use lockbox_hardware::mock::MockGpio;
///
/// let mut gpio = MockGpio::new();
/// gpio.set_output(LineId::new(0), Level::High).unwrap();
/// assert_eq!(gpio.output_level(LineId::new(0)), Some(Level::High));
/// ```
pub trait DigitalOutput {
    /// Drive `line` to `level`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::IoFault`](crate::HardwareError::IoFault) if the
    /// write could not be performed.
    fn set_output(&mut self, line: LineId, level: Level) -> Result<()>;
}

/// A bank of digital input lines.
pub trait DigitalInput {
    /// Read the current level of `line`.
    ///
    /// # Errors
    ///
    /// Returns [`HardwareError::IoFault`](crate::HardwareError::IoFault) if the
    /// read could not be performed.
    fn get_input(&mut self, line: LineId) -> Result<Level>;
}

/// Keypad scanner.
///
/// Returns the key currently held down, or `None` when no key is pressed.
/// Implementations debounce the matrix themselves; detecting the press edge
/// is left to the caller.
pub trait KeypadSource {
    fn poll_key(&mut self) -> Option<RawKey>;
}

/// Monotonic time source with a blocking wait.
///
/// The lock actuator times its pulse train against this clock, and the state
/// machine uses it for its deadlines. Tests substitute
/// [`ManualClock`](crate::mock::ManualClock) so no test waits in real time.
pub trait Clock {
    /// Current instant.
    fn now(&self) -> Instant;

    /// Block the caller for `duration`.
    fn sleep(&self, duration: Duration);
}

/// The host's monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Destination for telemetry events.
///
/// Delivery is best-effort. The controller logs a failed `emit` and carries on.
pub trait TelemetrySink {
    fn emit(&mut self, event: &TelemetryEvent) -> Result<()>;
}

/// Display that renders the session for the user.
///
/// Called only when the controller has marked the screen dirty. A failed
/// render is logged and never affects the access flow.
pub trait PresentationSink {
    fn render(&mut self, snapshot: &SessionSnapshot) -> Result<()>;
}

impl<T: TelemetrySink + ?Sized> TelemetrySink for Box<T> {
    fn emit(&mut self, event: &TelemetryEvent) -> Result<()> {
        (**self).emit(event)
    }
}

impl<T: PresentationSink + ?Sized> PresentationSink for Box<T> {
    fn render(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        (**self).render(snapshot)
    }
}
