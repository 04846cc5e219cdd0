//! Edge-triggered lock position sensor.

use lockbox_core::{LineId, LockPosition, SensorConfig};
use lockbox_hardware::{DigitalInput, Result};
use tracing::debug;

/// Reports the lock's mechanical position only when it changes.
///
/// # Examples
///
/// ```
/// use lockbox_core::{Level, LineId, LockPosition, SensorConfig};
/// use lockbox_engine::SensorReader;
/// use lockbox_hardware::mock::MockGpio;
///
/// let gpio = MockGpio::new();
/// let mut sensor = SensorReader::new(gpio.clone(), &SensorConfig::default());
///
/// assert_eq!(sensor.poll_edge().unwrap(), None);
///
/// gpio.set_input(LineId::new(27), Level::High);
/// assert_eq!(sensor.poll_edge().unwrap(), Some(LockPosition::Open));
/// assert_eq!(sensor.poll_edge().unwrap(), None);
/// ```
#[derive(Debug)]
pub struct SensorReader<I> {
    input: I,
    line: LineId,
    last: LockPosition,
}

impl<I: DigitalInput> SensorReader<I> {
    /// Create a reader that assumes the lock starts closed.
    pub fn new(input: I, config: &SensorConfig) -> Self {
        Self {
            input,
            line: config.sensor_line,
            last: LockPosition::Closed,
        }
    }

    /// Read the sensor and return the new position if it changed.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O fault. The remembered position is not
    /// updated in that case.
    pub fn poll_edge(&mut self) -> Result<Option<LockPosition>> {
        let position = LockPosition::from_level(self.input.get_input(self.line)?);

        if position == self.last {
            return Ok(None);
        }

        debug!(line = %self.line, from = %self.last, to = %position, "lock sensor edge");
        self.last = position;
        Ok(Some(position))
    }

    /// Last position observed.
    pub fn last_position(&self) -> LockPosition {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::Level;
    use lockbox_hardware::mock::MockGpio;

    const SENSOR: LineId = LineId::new(27);

    fn reader() -> (SensorReader<MockGpio>, MockGpio) {
        let gpio = MockGpio::new();
        let reader = SensorReader::new(gpio.clone(), &SensorConfig::default());
        (reader, gpio)
    }

    #[test]
    fn test_reports_each_edge_once() {
        let (mut sensor, gpio) = reader();

        gpio.set_input(SENSOR, Level::High);
        assert_eq!(sensor.poll_edge().unwrap(), Some(LockPosition::Open));
        assert_eq!(sensor.poll_edge().unwrap(), None);

        gpio.set_input(SENSOR, Level::Low);
        assert_eq!(sensor.poll_edge().unwrap(), Some(LockPosition::Closed));
        assert_eq!(sensor.last_position(), LockPosition::Closed);
    }

    #[test]
    fn test_initially_closed_line_reports_nothing() {
        let (mut sensor, _gpio) = reader();
        assert_eq!(sensor.poll_edge().unwrap(), None);
    }

    #[test]
    fn test_read_fault_keeps_last_position() {
        let (mut sensor, gpio) = reader();
        gpio.set_input(SENSOR, Level::High);
        gpio.set_fail_reads(true);

        assert!(sensor.poll_edge().is_err());
        assert_eq!(sensor.last_position(), LockPosition::Closed);

        gpio.set_fail_reads(false);
        assert_eq!(sensor.poll_edge().unwrap(), Some(LockPosition::Open));
    }
}
