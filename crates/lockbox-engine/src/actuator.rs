//! Lock actuator pulse sequencer.
//!
//! The lock is released by a software-timed pulse train on a single output
//! line, in two back-to-back phases:
//!
//! ```text
//!            release phase (500 ms)           re-seat phase (500 ms)
//!  high  ┌┐          ┌┐                 ┌┐          ┌┐
//!        ││          ││      ...        ││          ││      ...
//!  low  ─┘└──────────┘└────            ─┘└──────────┘└────
//!        |<- 1.9 ms  |<---- 20 ms ---->| <- 1.0 ms
//! ```
//!
//! No feedback is consulted while the train runs; completion is purely time
//! bounded. A failed write aborts the sequence immediately.

use std::time::Duration;

use lockbox_core::{ActuatorConfig, Level, LineId};
use lockbox_hardware::{Clock, DigitalOutput};
use tracing::{debug, error};

use crate::error::CoreFault;

/// Drives the lock's control line.
#[derive(Debug)]
pub struct LockActuator<O, C> {
    output: O,
    clock: C,
    config: ActuatorConfig,
}

impl<O: DigitalOutput, C: Clock> LockActuator<O, C> {
    pub fn new(output: O, clock: C, config: ActuatorConfig) -> Self {
        Self {
            output,
            clock,
            config,
        }
    }

    /// Drive the lock line to its resting (high) level.
    ///
    /// # Errors
    ///
    /// Returns `CoreFault::Actuator` if the write fails.
    pub fn initialize(&mut self) -> Result<(), CoreFault> {
        self.write(Level::High)
    }

    /// Run the full two-phase unlock pulse train.
    ///
    /// Returns the number of pulses emitted.
    ///
    /// # Errors
    ///
    /// Returns `CoreFault::Actuator` as soon as any write fails; the remaining
    /// pulses are not emitted.
    pub fn run_unlock_sequence(&mut self) -> Result<u32, CoreFault> {
        let line = self.config.lock_line;
        debug!(%line, "starting unlock sequence");

        let release = self.run_phase(self.config.release_high())?;
        let reseat = self.run_phase(self.config.reseat_high())?;

        debug!(%line, release, reseat, "unlock sequence complete");
        Ok(release + reseat)
    }

    pub fn lock_line(&self) -> LineId {
        self.config.lock_line
    }

    fn run_phase(&mut self, high: Duration) -> Result<u32, CoreFault> {
        let phase = self.config.phase_duration();
        let start = self.clock.now();
        let mut pulses = 0;

        while self.clock.now().saturating_duration_since(start) < phase {
            self.pulse(high)?;
            pulses += 1;
        }

        Ok(pulses)
    }

    fn pulse(&mut self, high: Duration) -> Result<(), CoreFault> {
        let period = self.config.pulse_period();

        self.write(Level::High)?;
        self.clock.sleep(high);
        self.write(Level::Low)?;
        self.clock.sleep(period.saturating_sub(high));
        Ok(())
    }

    fn write(&mut self, level: Level) -> Result<(), CoreFault> {
        let line = self.config.lock_line;
        self.output.set_output(line, level).map_err(|e| {
            error!(%line, %level, error = %e, "lock line write failed");
            CoreFault::Actuator(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_hardware::mock::{ManualClock, MockGpio};

    const RELEASE_HIGH: Duration = Duration::from_micros(1_900);
    const RESEAT_HIGH: Duration = Duration::from_micros(1_000);

    fn actuator() -> (LockActuator<MockGpio, ManualClock>, MockGpio, ManualClock) {
        let clock = ManualClock::new();
        let gpio = MockGpio::with_clock(clock.clone());
        let actuator = LockActuator::new(gpio.clone(), clock.clone(), ActuatorConfig::default());
        (actuator, gpio, clock)
    }

    #[test]
    fn test_initialize_drives_line_high() {
        let (mut actuator, gpio, _clock) = actuator();
        actuator.initialize().unwrap();
        assert_eq!(gpio.output_level(actuator.lock_line()), Some(Level::High));
    }

    #[test]
    fn test_sequence_emits_25_pulses_per_phase() {
        let (mut actuator, gpio, clock) = actuator();
        let start = clock.now();

        let pulses = actuator.run_unlock_sequence().unwrap();

        assert_eq!(pulses, 50);
        assert_eq!(gpio.writes().len(), 100);
        assert_eq!(clock.now() - start, Duration::from_secs(1));
    }

    #[test]
    fn test_pulse_widths_per_phase() {
        let (mut actuator, gpio, _clock) = actuator();
        actuator.run_unlock_sequence().unwrap();

        let writes = gpio.writes();
        let highs: Vec<Duration> = writes
            .chunks(2)
            .map(|pair| {
                assert_eq!(pair[0].level, Level::High);
                assert_eq!(pair[1].level, Level::Low);
                pair[1].at.unwrap() - pair[0].at.unwrap()
            })
            .collect();

        let (release, reseat) = highs.split_at(25);
        assert!(release.iter().all(|h| *h == RELEASE_HIGH));
        assert!(reseat.iter().all(|h| *h == RESEAT_HIGH));
    }

    #[test]
    fn test_pulse_period_is_constant() {
        let (mut actuator, gpio, _clock) = actuator();
        actuator.run_unlock_sequence().unwrap();

        let rising: Vec<_> = gpio
            .writes()
            .into_iter()
            .filter(|w| w.level == Level::High)
            .map(|w| w.at.unwrap())
            .collect();

        for pair in rising.windows(2) {
            assert_eq!(pair[1] - pair[0], Duration::from_millis(20));
        }
    }

    #[test]
    fn test_sequence_ends_low() {
        let (mut actuator, gpio, _clock) = actuator();
        actuator.run_unlock_sequence().unwrap();
        assert_eq!(gpio.output_level(actuator.lock_line()), Some(Level::Low));
    }

    #[test]
    fn test_write_fault_aborts_sequence() {
        let (mut actuator, gpio, _clock) = actuator();
        gpio.fail_writes_after(7);

        let err = actuator.run_unlock_sequence().unwrap_err();

        assert!(matches!(err, CoreFault::Actuator(_)));
        assert_eq!(gpio.writes().len(), 7);
    }

    #[test]
    fn test_custom_waveform() {
        let clock = ManualClock::new();
        let gpio = MockGpio::with_clock(clock.clone());
        let config = ActuatorConfig {
            phase_duration_ms: 100,
            pulse_period_us: 10_000,
            ..ActuatorConfig::default()
        };
        let mut actuator = LockActuator::new(gpio.clone(), clock, config);

        assert_eq!(actuator.run_unlock_sequence().unwrap(), 20);
    }
}
