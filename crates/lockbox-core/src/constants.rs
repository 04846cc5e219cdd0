//! Core constants for the compartment lock controller.
//!
//! This module centralizes the values that define the access policy, the
//! lock actuation waveform, and the default wiring of the controller board.
//! Runtime-tunable values are mirrored by the defaults in
//! [`crate::config::LockerConfig`]; the constants here are the single source
//! those defaults are built from.
//!
//! # Usage
//!
//! ```
//! use lockbox_core::constants::*;
//!
//! assert_eq!(CODE_LENGTH, 6);
//! assert_eq!(MAX_FAILED_ATTEMPTS, 3);
//!
//! // Each actuation phase emits whole pulses until its window has elapsed.
//! let pulses_per_phase = PHASE_DURATION_MS * 1000 / PULSE_PERIOD_US;
//! assert_eq!(pulses_per_phase, 25);
//! ```

// ============================================================================
// Access Policy
// ============================================================================

/// Number of digits in an access code.
///
/// Codes are always exactly this long: the confirm key is ignored until the
/// pending code is complete, and a seventh digit is silently rejected.
pub const CODE_LENGTH: usize = 6;

/// Number of consecutive mismatched codes that triggers a lockout.
pub const MAX_FAILED_ATTEMPTS: u8 = 3;

/// How long the "invalid code" screen is held before code entry resumes (ms).
pub const INVALID_CODE_DELAY_MS: u64 = 3_000;

/// How long further code entry is barred after too many failures (ms).
pub const LOCKOUT_DELAY_MS: u64 = 60_000;

// ============================================================================
// Lock Actuation Waveform
// ============================================================================

/// Duration of each of the two actuation phases (ms).
pub const PHASE_DURATION_MS: u64 = 500;

/// Period of a single sub-pulse (µs).
pub const PULSE_PERIOD_US: u64 = 20_000;

/// High time of each sub-pulse during the release phase (µs).
pub const RELEASE_HIGH_US: u64 = 1_900;

/// High time of each sub-pulse during the re-seat phase (µs).
pub const RESEAT_HIGH_US: u64 = 1_000;

// ============================================================================
// Board Wiring
// ============================================================================

/// GPIO line driving the lock actuator.
pub const DEFAULT_LOCK_LINE: u8 = 0;

/// GPIO line reading the lock position sensor.
pub const DEFAULT_SENSOR_LINE: u8 = 27;

/// Default polling cadence of the tick driver (ms).
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

/// Physical layout of the 4×4 matrix keypad, row by row.
///
/// ```text
/// 1 2 3 A
/// 4 5 6 B
/// 7 8 9 C
/// * 0 # D
/// ```
pub const KEYPAD_MATRIX: [[char; 4]; 4] = [
    ['1', '2', '3', 'A'],
    ['4', '5', '6', 'B'],
    ['7', '8', '9', 'C'],
    ['*', '0', '#', 'D'],
];

/// Character used to represent the dedicated alert button in text input.
pub const ALERT_KEY_CHAR: char = '!';
