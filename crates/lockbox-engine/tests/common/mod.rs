//! Common test utilities for integration tests.
//!
//! [`Locker`] wires an [`AccessStateMachine`] to mock peripherals the way the
//! simulator does: keys go through a [`MockKeypad`], the lock and its sensor
//! share one [`MockGpio`] bank, and time only moves when a test advances the
//! [`ManualClock`] (or the unlock sequence sleeps on it).
//!
//! # Usage
//!
//! ```ignore
//! let mut locker = Locker::new();
//! locker.store("123456");
//! locker.press_keys("A123456#");
//! assert_eq!(locker.state(), AccessState::Actuating);
//! ```

use std::time::Duration;

use lockbox_core::{AccessState, Level, LineId, LockPosition, LockerConfig, RawKey};
use lockbox_engine::{AccessStateMachine, TickOutcome};
use lockbox_hardware::KeypadSource;
use lockbox_hardware::mock::{
    ManualClock, MockGpio, MockKeypad, MockKeypadHandle, RecordingPresentation, RecordingTelemetry,
};

/// Line the lock actuator drives with the default configuration.
pub const LOCK_LINE: LineId = LineId::new(0);

/// Line the lock sensor is read from with the default configuration.
pub const SENSOR_LINE: LineId = LineId::new(27);

/// A controller wired to mock peripherals.
pub struct Locker {
    pub machine: AccessStateMachine<MockGpio, MockGpio, ManualClock>,
    pub keypad: MockKeypad,
    pub keys: MockKeypadHandle,
    pub gpio: MockGpio,
    pub clock: ManualClock,
    pub telemetry: RecordingTelemetry,
    pub display: RecordingPresentation,
}

impl Locker {
    pub fn new() -> Self {
        Self::with_config(LockerConfig::default())
    }

    pub fn with_config(config: LockerConfig) -> Self {
        let clock = ManualClock::new();
        let gpio = MockGpio::with_clock(clock.clone());
        let telemetry = RecordingTelemetry::new();
        let display = RecordingPresentation::new();
        let (keypad, keys) = MockKeypad::new();

        let machine = AccessStateMachine::builder(gpio.clone(), gpio.clone(), clock.clone())
            .with_config(config)
            .with_telemetry(telemetry.clone())
            .with_presentation(display.clone())
            .build()
            .expect("controller should build with mock peripherals");

        Self {
            machine,
            keypad,
            keys,
            gpio,
            clock,
            telemetry,
            display,
        }
    }

    /// One polling cycle: read the keypad, then tick.
    pub fn step(&mut self) -> TickOutcome {
        let key = self.keypad.poll_key();
        self.machine.tick(key)
    }

    /// Step and fail the test on any fault.
    pub fn step_ok(&mut self) {
        let outcome = self.step();
        assert!(outcome.fault.is_none(), "unexpected fault: {:?}", outcome.fault);
    }

    /// Queue one key and run the two polls it takes to press and release it.
    pub fn press(&mut self, key: RawKey) {
        self.keys.try_send_key(key).expect("keypad channel open");
        self.step_ok();
        self.step_ok();
    }

    /// Press each key character in turn (`0-9 A-D * # !`).
    pub fn press_keys(&mut self, keys: &str) {
        for c in keys.chars() {
            let key = RawKey::from_char(c).expect("valid keypad character");
            self.press(key);
        }
    }

    /// Move the simulated lock and run one tick so the edge is seen.
    pub fn set_lock(&mut self, position: LockPosition) {
        self.gpio.set_input(SENSOR_LINE, position.to_level());
        self.step_ok();
    }

    /// Advance time and run one tick.
    pub fn wait(&mut self, duration: Duration) {
        self.clock.advance(duration);
        self.step_ok();
    }

    /// Store an item under `code`: open, close, and return to the menu.
    pub fn store(&mut self, code: &str) {
        assert!(!self.machine.session().occupied(), "compartment already occupied");
        self.cycle(code);
        assert!(self.machine.session().occupied());
    }

    /// Retrieve the item with `code`: open, close, and return to the menu.
    pub fn retrieve(&mut self, code: &str) {
        assert!(self.machine.session().occupied(), "compartment is empty");
        self.cycle(code);
        assert!(!self.machine.session().occupied());
    }

    /// Submit a wrong code and sit out the invalid-code window.
    pub fn fail_attempt(&mut self, code: &str) {
        self.press_keys(code);
        self.press(RawKey::Hash);
        assert_eq!(self.state(), AccessState::InvalidCode);
        self.wait(Duration::from_secs(3));
    }

    pub fn state(&self) -> AccessState {
        self.machine.state()
    }

    /// Whole seconds left in the current timed window.
    pub fn time_remaining_secs(&self) -> Option<u64> {
        self.machine.time_remaining().map(|d| d.as_secs())
    }

    pub fn lock_level(&self) -> Option<Level> {
        self.gpio.output_level(LOCK_LINE)
    }

    fn cycle(&mut self, code: &str) {
        self.press(RawKey::A);
        self.press_keys(code);
        self.press(RawKey::Hash);
        assert_eq!(self.state(), AccessState::Actuating);

        self.set_lock(LockPosition::Open);
        self.set_lock(LockPosition::Closed);
        assert_eq!(self.state(), AccessState::Closed);

        self.press(RawKey::A);
        assert_eq!(self.state(), AccessState::Idle);
    }
}
