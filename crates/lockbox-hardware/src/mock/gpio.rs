//! Mock GPIO bank for testing and development.
//!
//! This module provides a simulated bank of digital lines that records every
//! write, lets tests set input levels, and can inject read and write faults.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use lockbox_core::{Level, LineId};

use crate::{
    HardwareError, Result,
    mock::ManualClock,
    traits::{Clock, DigitalInput, DigitalOutput},
};

/// A single recorded output write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteRecord {
    /// Line that was written.
    pub line: LineId,

    /// Level it was driven to.
    pub level: Level,

    /// Clock reading at the time of the write, if the bank has a clock.
    pub at: Option<Instant>,
}

/// Number of most recent writes kept by [`MockGpio`].
pub const MAX_RECORDED_WRITES: usize = 1024;

#[derive(Debug, Default)]
struct GpioState {
    outputs: HashMap<LineId, Level>,
    inputs: HashMap<LineId, Level>,
    writes: VecDeque<WriteRecord>,
    writes_before_fault: Option<usize>,
    fail_reads: bool,
}

/// Mock GPIO bank implementing both [`DigitalOutput`] and [`DigitalInput`].
///
/// Input lines read low until set with [`MockGpio::set_input`].
///
/// # Examples
///
/// ```
/// use lockbox_core::{Level, LineId};
/// use lockbox_hardware::mock::MockGpio;
/// use lockbox_hardware::traits::{DigitalInput, DigitalOutput};
///
/// let mut gpio = MockGpio::new();
/// let sensor = LineId::new(27);
///
/// assert_eq!(gpio.get_input(sensor).unwrap(), Level::Low);
/// gpio.set_input(sensor, Level::High);
/// assert_eq!(gpio.get_input(sensor).unwrap(), Level::High);
///
/// // Inject a fault after two successful writes
/// gpio.fail_writes_after(2);
/// gpio.set_output(LineId::new(0), Level::High).unwrap();
/// gpio.set_output(LineId::new(0), Level::Low).unwrap();
/// assert!(gpio.set_output(LineId::new(0), Level::High).is_err());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockGpio {
    state: Arc<Mutex<GpioState>>,
    clock: Option<ManualClock>,
}

impl MockGpio {
    /// Create a bank that does not timestamp writes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bank that stamps every write with `clock`'s current reading.
    pub fn with_clock(clock: ManualClock) -> Self {
        Self {
            state: Arc::default(),
            clock: Some(clock),
        }
    }

    /// Set the level an input line will read.
    pub fn set_input(&self, line: LineId, level: Level) {
        self.state().inputs.insert(line, level);
    }

    /// Last level written to an output line, if any.
    pub fn output_level(&self, line: LineId) -> Option<Level> {
        self.state().outputs.get(&line).copied()
    }

    /// Recorded writes, oldest first. Only the last
    /// [`MAX_RECORDED_WRITES`] are kept.
    pub fn writes(&self) -> Vec<WriteRecord> {
        self.state().writes.iter().copied().collect()
    }

    /// Writes recorded for one line, oldest first.
    pub fn writes_to(&self, line: LineId) -> Vec<WriteRecord> {
        self.state()
            .writes
            .iter()
            .filter(|w| w.line == line)
            .copied()
            .collect()
    }

    /// Forget recorded writes.
    pub fn clear_writes(&self) {
        self.state().writes.clear();
    }

    /// Let `count` more writes succeed, then fail every write.
    pub fn fail_writes_after(&self, count: usize) {
        self.state().writes_before_fault = Some(count);
    }

    /// Make every read fail (or succeed again).
    pub fn set_fail_reads(&self, fail: bool) {
        self.state().fail_reads = fail;
    }

    /// Remove all injected faults.
    pub fn clear_faults(&self) {
        let mut state = self.state();
        state.writes_before_fault = None;
        state.fail_reads = false;
    }

    fn state(&self) -> MutexGuard<'_, GpioState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DigitalOutput for MockGpio {
    fn set_output(&mut self, line: LineId, level: Level) -> Result<()> {
        let at = self.clock.as_ref().map(Clock::now);
        let mut state = self.state();

        if let Some(remaining) = state.writes_before_fault.as_mut() {
            if *remaining == 0 {
                return Err(HardwareError::io_fault(line, "injected write fault"));
            }
            *remaining -= 1;
        }

        state.outputs.insert(line, level);
        if state.writes.len() == MAX_RECORDED_WRITES {
            state.writes.pop_front();
        }
        state.writes.push_back(WriteRecord { line, level, at });
        Ok(())
    }
}

impl DigitalInput for MockGpio {
    fn get_input(&mut self, line: LineId) -> Result<Level> {
        let state = self.state();
        if state.fail_reads {
            return Err(HardwareError::io_fault(line, "injected read fault"));
        }
        Ok(state.inputs.get(&line).copied().unwrap_or(Level::Low))
    }
}
