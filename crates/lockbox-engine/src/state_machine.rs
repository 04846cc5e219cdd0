//! Compartment access state machine.
//!
//! This module owns the whole session of the locker: which screen the user is
//! on, the code being typed, whether the compartment holds an item, and the
//! failed-attempt counter. It is driven by [`AccessStateMachine::tick`], called
//! once per polling cycle with the key currently held on the keypad.
//!
//! # States
//!
//! - `Idle`: Showing whether the compartment is empty or occupied
//! - `EnteringCode`: Collecting the six-digit code
//! - `Actuating`: Pulsing the lock open, then waiting for the sensor
//! - `Open`: Lock physically open
//! - `Closed`: Lock closed again; finish or reopen
//! - `InvalidCode`: Mismatched code, held for the display delay
//! - `LockedOut`: Too many mismatches, held for the lockout delay
//!
//! # Tick Sequence
//!
//! 1. Poll the lock sensor for an edge (an I/O fault aborts the tick here).
//!    An open edge seen while entry effects are still owed is held and
//!    replayed once they complete
//! 2. Derive the effective action: sensor edges and expired timed windows
//!    force an advance, otherwise the newly pressed key is classified
//! 3. Apply the action to the transition table
//! 4. Render if the screen is dirty
//! 5. Run entry effects of a newly entered state (unlock sequence, deadlines)
//!
//! # Examples
//!
//! ```
//! use lockbox_core::{AccessState, Digit, RawKey};
//! use lockbox_engine::AccessStateMachine;
//! use lockbox_hardware::mock::{ManualClock, MockGpio};
//!
//! let clock = ManualClock::new();
//! let gpio = MockGpio::with_clock(clock.clone());
//! let mut machine = AccessStateMachine::builder(gpio.clone(), gpio.clone(), clock)
//!     .build()
//!     .unwrap();
//!
//! let mut press = |key: RawKey| {
//!     machine.tick(Some(key));
//!     machine.tick(None);
//! };
//!
//! press(RawKey::A);
//! for d in [1, 2, 3, 4, 5, 6] {
//!     press(RawKey::Digit(Digit::new(d).unwrap()));
//! }
//! press(RawKey::Hash);
//!
//! assert_eq!(machine.state(), AccessState::Actuating);
//! assert!(machine.session().occupied());
//! ```

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use lockbox_core::{
    AccessState, LockPosition, LockerConfig, OperationKind, RawKey, SessionSnapshot, TimingConfig,
    constants::MAX_FAILED_ATTEMPTS,
};
use lockbox_hardware::{
    Clock, DigitalInput, DigitalOutput, PresentationSink, TelemetryEvent, TelemetryKind,
    TelemetrySink,
};
use tracing::{debug, error, info, warn};

use crate::actuator::LockActuator;
use crate::code_buffer::CodeBuffer;
use crate::error::CoreFault;
use crate::input::{Action, AdvanceTrigger, classify};
use crate::sensor::SensorReader;

/// Maximum number of state transitions to keep in history.
///
/// A complete store-and-retrieve cycle is about a dozen transitions, so this
/// covers several recent sessions for post-incident inspection.
const MAX_HISTORY_SIZE: usize = 100;

/// A single recorded state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateTransition {
    /// The state transitioned from.
    pub from: AccessState,

    /// The state transitioned to.
    pub to: AccessState,

    /// Clock reading when the transition occurred.
    pub at: Instant,
}

/// Result of one tick.
#[derive(Debug, Default)]
pub struct TickOutcome {
    /// Whether the presentation sink was asked to redraw this tick.
    pub redraw: bool,

    /// Fault that cut the tick short, if any.
    pub fault: Option<CoreFault>,
}

impl TickOutcome {
    fn fault(fault: CoreFault) -> Self {
        Self {
            redraw: false,
            fault: Some(fault),
        }
    }
}

/// The mutable session record. Only the state machine writes to it.
#[derive(Debug, Clone)]
pub struct SessionState {
    state: AccessState,
    operation: Option<OperationKind>,
    occupied: bool,
    codes: CodeBuffer,
    failed_attempts: u8,
    reopen_requested: bool,
    sensor_position: LockPosition,
    redraw_needed: bool,
    alerted: bool,
    deadline: Option<Instant>,
    key_held: bool,
}

impl SessionState {
    fn new() -> Self {
        Self {
            state: AccessState::Idle,
            operation: None,
            occupied: false,
            codes: CodeBuffer::new(),
            failed_attempts: 0,
            reopen_requested: false,
            sensor_position: LockPosition::Closed,
            redraw_needed: true,
            alerted: false,
            deadline: None,
            key_held: false,
        }
    }

    pub fn state(&self) -> AccessState {
        self.state
    }

    pub fn operation(&self) -> Option<OperationKind> {
        self.operation
    }

    pub fn occupied(&self) -> bool {
        self.occupied
    }

    pub fn codes(&self) -> &CodeBuffer {
        &self.codes
    }

    pub fn failed_attempts(&self) -> u8 {
        self.failed_attempts
    }

    pub fn reopen_requested(&self) -> bool {
        self.reopen_requested
    }

    pub fn sensor_position(&self) -> LockPosition {
        self.sensor_position
    }

    pub fn redraw_needed(&self) -> bool {
        self.redraw_needed
    }

    pub fn alerted(&self) -> bool {
        self.alerted
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            occupied: self.occupied,
            operation: self.operation,
            pending_len: self.codes.pending_len(),
            failed_attempts: self.failed_attempts,
            reopen_requested: self.reopen_requested,
            sensor_position: self.sensor_position,
        }
    }
}

/// Why the lock is being actuated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnlockReason {
    Reopen,
    Store,
    Retrieve,
}

impl UnlockReason {
    fn telemetry(self) -> TelemetryKind {
        match self {
            UnlockReason::Reopen => TelemetryKind::Reopened,
            UnlockReason::Store => TelemetryKind::OpenedToStore,
            UnlockReason::Retrieve => TelemetryKind::OpenedToRetrieve,
        }
    }
}

/// Access-control state machine for a single compartment.
///
/// # Thread Safety
///
/// The machine is driven from one thread. It is `Send` when its peripherals
/// are, so a driver may move it onto a dedicated thread.
pub struct AccessStateMachine<O, I, C> {
    session: SessionState,

    /// State whose entry effects have completed.
    entered: AccessState,

    /// The lock was seen open while entry effects were still owed.
    held_open: bool,

    actuator: LockActuator<O, C>,
    sensor: SensorReader<I>,
    clock: C,
    timing: TimingConfig,
    telemetry: Option<Box<dyn TelemetrySink + Send>>,
    presentation: Option<Box<dyn PresentationSink + Send>>,

    /// History of state transitions (limited to MAX_HISTORY_SIZE).
    history: VecDeque<StateTransition>,
}

impl<O, I, C> AccessStateMachine<O, I, C>
where
    O: DigitalOutput,
    I: DigitalInput,
    C: Clock + Clone,
{
    /// Create a builder from the lock output, the sensor input and a clock.
    pub fn builder(output: O, input: I, clock: C) -> AccessStateMachineBuilder<O, I, C> {
        AccessStateMachineBuilder {
            output,
            input,
            clock,
            config: LockerConfig::default(),
            telemetry: None,
            presentation: None,
        }
    }

    /// Run one polling cycle.
    ///
    /// `raw_key` is the key currently held down, or `None` when the keypad is
    /// idle. Only the press edge counts: a key reported on consecutive ticks
    /// is processed once.
    pub fn tick(&mut self, raw_key: Option<RawKey>) -> TickOutcome {
        let edge = match self.sensor.poll_edge() {
            Ok(edge) => edge,
            Err(e) => {
                error!(error = %e, "sensor read failed, skipping tick");
                return TickOutcome::fault(CoreFault::Io(e));
            }
        };

        let effects_pending = self.entered != self.session.state;
        if let Some(position) = edge {
            info!(%position, "lock position changed");
            self.session.sensor_position = position;
            if effects_pending && position.is_open() {
                debug!("holding open edge until entry effects complete");
                self.held_open = true;
            }
        }

        // A held edge is replayed on the first tick after the effects succeed
        let replay = !effects_pending && self.held_open;

        let pressed = self.press_edge(raw_key);
        let action = self.effective_action(edge.is_some() || replay, pressed);

        let applied = self.apply(action);
        if replay {
            self.held_open = false;
        }
        match applied {
            Ok(true) => self.session.redraw_needed = true,
            Ok(false) => {}
            Err(fault) => {
                error!(error = %fault, "transition refused");
                return TickOutcome::fault(fault);
            }
        }

        let redraw = self.render_if_needed();

        let fault = self.run_entry_effects().err();
        TickOutcome { redraw, fault }
    }

    /// Re-arm the alert latch so the next alert press is reported again.
    pub fn reset_alert(&mut self) {
        if self.session.alerted {
            info!("alert latch reset");
        }
        self.session.alerted = false;
    }

    pub fn state(&self) -> AccessState {
        self.session.state
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    /// Recorded transitions, oldest first.
    pub fn history(&self) -> &VecDeque<StateTransition> {
        &self.history
    }

    /// Time left in the current timed window (invalid code or lockout).
    pub fn time_remaining(&self) -> Option<Duration> {
        self.session
            .deadline
            .map(|deadline| deadline.saturating_duration_since(self.clock.now()))
    }

    fn press_edge(&mut self, raw_key: Option<RawKey>) -> Option<RawKey> {
        match raw_key {
            Some(key) if !self.session.key_held => {
                self.session.key_held = true;
                debug!(%key, "key pressed");
                Some(key)
            }
            Some(_) => None,
            None => {
                self.session.key_held = false;
                None
            }
        }
    }

    fn effective_action(&self, sensor_changed: bool, pressed: Option<RawKey>) -> Action {
        let state = self.session.state;

        // Entry effects still pending (an earlier unlock attempt faulted):
        // nothing may move the machine on until they complete.
        if self.entered != state {
            return Action::None;
        }

        if state.is_auto_advancing() {
            if let Some(key) = pressed {
                debug!(%key, %state, "ignoring key during timed window");
            }
            return match self.session.deadline {
                Some(deadline) if self.clock.now() < deadline => Action::None,
                _ => Action::Advance(AdvanceTrigger::Forced),
            };
        }

        if sensor_changed {
            if let Some(key) = pressed {
                debug!(%key, "sensor edge overrides key press");
            }
            return Action::Advance(AdvanceTrigger::Forced);
        }

        pressed.map_or(Action::None, classify)
    }

    /// Apply an action. Returns whether anything visible changed.
    fn apply(&mut self, action: Action) -> Result<bool, CoreFault> {
        let in_code_entry = self.session.state == AccessState::EnteringCode;

        match action {
            Action::Advance(trigger) => self.advance(trigger),
            Action::AppendDigit(digit) if in_code_entry => Ok(self.session.codes.append(digit)),
            Action::DeleteDigit if in_code_entry => Ok(self.session.codes.remove_last()),
            Action::Retreat if in_code_entry => {
                self.session.codes.clear();
                self.transition_to(AccessState::Idle)?;
                Ok(true)
            }
            Action::Alert => {
                self.raise_alert();
                Ok(false)
            }
            _ => Ok(false),
        }
    }

    fn advance(&mut self, trigger: AdvanceTrigger) -> Result<bool, CoreFault> {
        use AccessState::*;

        let held_open = self.held_open;
        let session = &mut self.session;
        let next = match (session.state, trigger) {
            (Idle, AdvanceTrigger::Menu) => {
                session.operation = Some(OperationKind::for_occupancy(session.occupied));
                EnteringCode
            }
            (EnteringCode, AdvanceTrigger::Confirm) if session.codes.is_complete() => {
                if session.occupied && !session.codes.matches_committed() {
                    session.failed_attempts += 1;
                    session.codes.clear();
                    warn!(
                        attempts = session.failed_attempts,
                        max = MAX_FAILED_ATTEMPTS,
                        "code mismatch"
                    );
                    InvalidCode
                } else {
                    Actuating
                }
            }
            (Actuating, _) if session.sensor_position.is_open() || held_open => Open,
            (Open, _) if !session.sensor_position.is_open() => Closed,
            (Closed, AdvanceTrigger::Menu) => Idle,
            (Closed, AdvanceTrigger::Reopen) => {
                session.reopen_requested = true;
                Actuating
            }
            (InvalidCode, AdvanceTrigger::Forced) => {
                if session.failed_attempts >= MAX_FAILED_ATTEMPTS {
                    LockedOut
                } else {
                    EnteringCode
                }
            }
            (LockedOut, AdvanceTrigger::Forced) => {
                session.failed_attempts = 0;
                Idle
            }
            _ => return Ok(false),
        };

        self.transition_to(next)?;

        // Opened and closed again while the unlock was being retried
        let next = if next == Open && !self.session.sensor_position.is_open() {
            self.transition_to(Closed)?;
            Closed
        } else {
            next
        };

        if next == Closed {
            self.emit(TelemetryKind::Closed);
        }

        Ok(true)
    }

    fn transition_to(&mut self, next: AccessState) -> Result<(), CoreFault> {
        let from = self.session.state;

        debug_assert!(
            from.can_transition_to(&next),
            "invalid transition {from} -> {next}"
        );
        if !from.can_transition_to(&next) {
            return Err(CoreFault::InvalidTransition { from, to: next });
        }

        if next == AccessState::EnteringCode {
            self.session.codes.clear();
        }

        self.session.state = next;
        self.session.deadline = None;
        info!(%from, to = %next, "state transition");

        self.history.push_back(StateTransition {
            from,
            to: next,
            at: self.clock.now(),
        });
        if self.history.len() > MAX_HISTORY_SIZE {
            self.history.pop_front();
        }

        Ok(())
    }

    fn run_entry_effects(&mut self) -> Result<(), CoreFault> {
        let state = self.session.state;
        if self.entered == state {
            return Ok(());
        }

        match state {
            AccessState::Actuating => self.unlock()?,
            AccessState::InvalidCode => {
                self.session.deadline = Some(self.clock.now() + self.timing.invalid_code_delay());
            }
            AccessState::LockedOut => {
                let delay = self.timing.lockout_delay();
                warn!(
                    lockout_secs = delay.as_secs(),
                    "too many failed attempts, code entry locked out"
                );
                self.session.deadline = Some(self.clock.now() + delay);
            }
            _ => {}
        }

        self.entered = state;
        Ok(())
    }

    /// Run the unlock sequence and, once it has fully completed, apply the
    /// session changes for the reason the lock was opened.
    fn unlock(&mut self) -> Result<(), CoreFault> {
        let session = &self.session;
        let reason = if session.reopen_requested {
            UnlockReason::Reopen
        } else if !session.occupied {
            UnlockReason::Store
        } else {
            UnlockReason::Retrieve
        };
        debug_assert!(
            reason != UnlockReason::Retrieve || session.codes.matches_committed(),
            "retrieve actuation without a validated code"
        );

        let pulses = self.actuator.run_unlock_sequence()?;

        let session = &mut self.session;
        match reason {
            UnlockReason::Reopen => session.reopen_requested = false,
            UnlockReason::Store => {
                session.codes.commit();
                session.occupied = true;
            }
            UnlockReason::Retrieve => {
                session.codes.discard_committed();
                session.occupied = false;
                session.failed_attempts = 0;
            }
        }
        session.codes.clear();
        session.redraw_needed = true;

        info!(
            ?reason,
            pulses,
            occupied = session.occupied,
            "lock actuated"
        );
        self.emit(reason.telemetry());
        Ok(())
    }

    fn raise_alert(&mut self) {
        let state = self.session.state;
        if state.suppresses_alert() || self.session.alerted {
            return;
        }

        self.session.alerted = true;
        warn!(%state, "alert button pressed while locked");
        self.emit(TelemetryKind::Alert);
    }

    fn emit(&mut self, kind: TelemetryKind) {
        let Some(sink) = self.telemetry.as_mut() else {
            debug!(?kind, "no telemetry sink configured");
            return;
        };

        let event = TelemetryEvent::new(kind);
        if let Err(e) = sink.emit(&event) {
            warn!(name = %event.name, error = %e, "telemetry delivery failed");
        }
    }

    fn render_if_needed(&mut self) -> bool {
        if !self.session.redraw_needed {
            return false;
        }
        self.session.redraw_needed = false;

        let snapshot = self.session.snapshot();
        if let Some(sink) = self.presentation.as_mut()
            && let Err(e) = sink.render(&snapshot)
        {
            warn!(state = %snapshot.state, error = %e, "render failed");
        }
        true
    }
}

/// Builder for constructing [`AccessStateMachine`] instances.
///
/// # Examples
///
/// ```
/// use lockbox_core::LockerConfig;
/// use lockbox_engine::AccessStateMachine;
/// use lockbox_hardware::mock::{ManualClock, MockGpio, RecordingTelemetry};
///
/// let gpio = MockGpio::new();
/// let telemetry = RecordingTelemetry::new();
///
/// let machine = AccessStateMachine::builder(gpio.clone(), gpio, ManualClock::new())
///     .with_config(LockerConfig::default())
///     .with_telemetry(telemetry)
///     .build()
///     .unwrap();
/// ```
pub struct AccessStateMachineBuilder<O, I, C> {
    output: O,
    input: I,
    clock: C,
    config: LockerConfig,
    telemetry: Option<Box<dyn TelemetrySink + Send>>,
    presentation: Option<Box<dyn PresentationSink + Send>>,
}

impl<O, I, C> AccessStateMachineBuilder<O, I, C>
where
    O: DigitalOutput,
    I: DigitalInput,
    C: Clock + Clone,
{
    pub fn with_config(mut self, config: LockerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_telemetry(mut self, sink: impl TelemetrySink + Send + 'static) -> Self {
        self.telemetry = Some(Box::new(sink));
        self
    }

    pub fn with_presentation(mut self, sink: impl PresentationSink + Send + 'static) -> Self {
        self.presentation = Some(Box::new(sink));
        self
    }

    /// Validate the configuration, park the lock line at its resting level and
    /// build the machine in `Idle`.
    ///
    /// # Errors
    ///
    /// Returns `CoreFault::Config` for an invalid configuration, or
    /// `CoreFault::Actuator` if the lock line cannot be driven.
    pub fn build(self) -> Result<AccessStateMachine<O, I, C>, CoreFault> {
        self.config.validate()?;

        let mut actuator = LockActuator::new(
            self.output,
            self.clock.clone(),
            self.config.actuator.clone(),
        );
        actuator.initialize()?;

        let sensor = SensorReader::new(self.input, &self.config.sensor);

        info!(
            lock_line = %self.config.actuator.lock_line,
            sensor_line = %self.config.sensor.sensor_line,
            "access controller ready"
        );

        Ok(AccessStateMachine {
            session: SessionState::new(),
            entered: AccessState::Idle,
            held_open: false,
            actuator,
            sensor,
            clock: self.clock,
            timing: self.config.timing,
            telemetry: self.telemetry,
            presentation: self.presentation,
            history: VecDeque::with_capacity(MAX_HISTORY_SIZE),
        })
    }
}
