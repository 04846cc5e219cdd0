//! Runtime configuration for the lock controller.
//!
//! All durations are expressed as integer milliseconds or microseconds so the
//! configuration round-trips cleanly through TOML and JSON. Accessor methods
//! convert them to [`Duration`] for use by the engine.
//!
//! # Examples
//!
//! ```
//! use lockbox_core::LockerConfig;
//! use std::time::Duration;
//!
//! let config = LockerConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.timing.lockout_delay(), Duration::from_secs(60));
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    LineId, Result,
    constants::{
        DEFAULT_LOCK_LINE, DEFAULT_SENSOR_LINE, DEFAULT_TICK_INTERVAL_MS, INVALID_CODE_DELAY_MS,
        LOCKOUT_DELAY_MS, PHASE_DURATION_MS, PULSE_PERIOD_US, RELEASE_HIGH_US, RESEAT_HIGH_US,
    },
    error::Error,
};

/// Top-level controller configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockerConfig {
    /// Lock actuator wiring and waveform.
    pub actuator: ActuatorConfig,

    /// Lock position sensor wiring.
    pub sensor: SensorConfig,

    /// Policy delays and driver cadence.
    pub timing: TimingConfig,
}

impl LockerConfig {
    /// Check the configuration for values the engine cannot operate with.
    ///
    /// # Errors
    /// Returns `Error::Config` describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.actuator.validate()?;
        self.timing.validate()?;

        if self.actuator.lock_line == self.sensor.sensor_line {
            return Err(Error::Config(format!(
                "lock line and sensor line must differ (both {})",
                self.sensor.sensor_line
            )));
        }

        Ok(())
    }
}

/// Lock actuator configuration.
///
/// The unlock waveform is two phases of `phase_duration_ms` each. Within a
/// phase the line is pulsed with period `pulse_period_us`, staying high for
/// `release_high_us` (phase one) or `reseat_high_us` (phase two).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActuatorConfig {
    /// Output line driving the lock.
    pub lock_line: LineId,

    /// Length of each actuation phase in milliseconds.
    pub phase_duration_ms: u64,

    /// Sub-pulse period in microseconds.
    pub pulse_period_us: u64,

    /// High time of each release-phase pulse in microseconds.
    pub release_high_us: u64,

    /// High time of each re-seat-phase pulse in microseconds.
    pub reseat_high_us: u64,
}

impl ActuatorConfig {
    pub fn phase_duration(&self) -> Duration {
        Duration::from_millis(self.phase_duration_ms)
    }

    pub fn pulse_period(&self) -> Duration {
        Duration::from_micros(self.pulse_period_us)
    }

    pub fn release_high(&self) -> Duration {
        Duration::from_micros(self.release_high_us)
    }

    pub fn reseat_high(&self) -> Duration {
        Duration::from_micros(self.reseat_high_us)
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("phase_duration_ms", self.phase_duration_ms),
            ("pulse_period_us", self.pulse_period_us),
        ] {
            if value == 0 {
                return Err(Error::Config(format!("actuator.{name} must be > 0")));
            }
        }
        for (name, high) in [
            ("release_high_us", self.release_high_us),
            ("reseat_high_us", self.reseat_high_us),
        ] {
            if high == 0 || high >= self.pulse_period_us {
                return Err(Error::Config(format!(
                    "actuator.{name} must be within (0, {}), got {high}",
                    self.pulse_period_us
                )));
            }
        }
        Ok(())
    }
}

impl Default for ActuatorConfig {
    fn default() -> Self {
        Self {
            lock_line: LineId::new(DEFAULT_LOCK_LINE),
            phase_duration_ms: PHASE_DURATION_MS,
            pulse_period_us: PULSE_PERIOD_US,
            release_high_us: RELEASE_HIGH_US,
            reseat_high_us: RESEAT_HIGH_US,
        }
    }
}

/// Lock position sensor configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Input line reporting the lock position (high = open).
    pub sensor_line: LineId,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            sensor_line: LineId::new(DEFAULT_SENSOR_LINE),
        }
    }
}

/// Policy delays and tick cadence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long the invalid-code screen is held (ms).
    pub invalid_code_delay_ms: u64,

    /// How long code entry is barred after a lockout (ms).
    pub lockout_delay_ms: u64,

    /// Polling cadence of the tick driver (ms).
    pub tick_interval_ms: u64,
}

impl TimingConfig {
    pub fn invalid_code_delay(&self) -> Duration {
        Duration::from_millis(self.invalid_code_delay_ms)
    }

    pub fn lockout_delay(&self) -> Duration {
        Duration::from_millis(self.lockout_delay_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            return Err(Error::Config("timing.tick_interval_ms must be > 0".into()));
        }
        Ok(())
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            invalid_code_delay_ms: INVALID_CODE_DELAY_MS,
            lockout_delay_ms: LOCKOUT_DELAY_MS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(LockerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_waveform_durations() {
        let actuator = ActuatorConfig::default();
        assert_eq!(actuator.phase_duration(), Duration::from_millis(500));
        assert_eq!(actuator.pulse_period(), Duration::from_millis(20));
        assert_eq!(actuator.release_high(), Duration::from_micros(1_900));
        assert_eq!(actuator.reseat_high(), Duration::from_micros(1_000));
    }

    #[test]
    fn test_rejects_high_time_longer_than_period() {
        let mut config = LockerConfig::default();
        config.actuator.release_high_us = config.actuator.pulse_period_us;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config(msg) if msg.contains("release_high_us")));
    }

    #[test]
    fn test_rejects_shared_lock_and_sensor_line() {
        let mut config = LockerConfig::default();
        config.sensor.sensor_line = config.actuator.lock_line;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_tick_interval() {
        let mut config = LockerConfig::default();
        config.timing.tick_interval_ms = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: LockerConfig =
            serde_json::from_str(r#"{ "timing": { "lockout_delay_ms": 5000 } }"#).unwrap();

        assert_eq!(config.timing.lockout_delay(), Duration::from_secs(5));
        assert_eq!(config.timing.invalid_code_delay_ms, INVALID_CODE_DELAY_MS);
        assert_eq!(config.actuator, ActuatorConfig::default());
    }
}
