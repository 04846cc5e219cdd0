//! Property-based tests for the access state machine.
//!
//! These tests feed random sequences of key presses, held keys, lock sensor
//! movements and elapsed time into the controller and verify that the
//! session invariants hold after every tick.

mod common;

use std::time::Duration;

use common::{Locker, SENSOR_LINE};
use lockbox_core::{AccessState, Digit, Level, RawKey, constants::CODE_LENGTH};
use proptest::prelude::*;

/// One thing that can happen to the locker between checks.
#[derive(Debug, Clone)]
enum Event {
    Press(RawKey),
    Hold(RawKey, u8),
    Lock(bool),
    Elapse(u64),
}

/// Strategy for any key on the keypad, plus the alert button.
fn any_key() -> impl Strategy<Value = RawKey> {
    prop_oneof![
        4 => (0u8..=9).prop_map(|d| RawKey::Digit(Digit::new(d).unwrap())),
        1 => Just(RawKey::A),
        1 => Just(RawKey::B),
        1 => Just(RawKey::C),
        1 => Just(RawKey::D),
        1 => Just(RawKey::Star),
        2 => Just(RawKey::Hash),
        1 => Just(RawKey::Alert),
    ]
}

fn any_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        8 => any_key().prop_map(Event::Press),
        1 => (any_key(), 2u8..6).prop_map(|(k, n)| Event::Hold(k, n)),
        2 => any::<bool>().prop_map(Event::Lock),
        2 => prop_oneof![Just(1_000u64), Just(3_000), Just(60_000)].prop_map(Event::Elapse),
    ]
}

/// Apply an event straight to the machine, one tick per polling cycle.
fn apply(locker: &mut Locker, event: &Event) {
    match *event {
        Event::Press(key) => {
            locker.machine.tick(Some(key));
            locker.machine.tick(None);
        }
        Event::Hold(key, ticks) => {
            for _ in 0..ticks {
                locker.machine.tick(Some(key));
            }
            locker.machine.tick(None);
        }
        Event::Lock(open) => {
            let level = if open { Level::High } else { Level::Low };
            locker.gpio.set_input(SENSOR_LINE, level);
            locker.machine.tick(None);
        }
        Event::Elapse(ms) => {
            locker.clock.advance(Duration::from_millis(ms));
            locker.machine.tick(None);
        }
    }
}

fn check_invariants(locker: &Locker) -> Result<(), TestCaseError> {
    let session = locker.machine.session();
    let codes = session.codes();

    prop_assert!(codes.pending_len() <= CODE_LENGTH);
    prop_assert!(session.failed_attempts() <= 3);
    prop_assert_eq!(session.occupied(), codes.has_committed());

    match session.state() {
        AccessState::Idle => prop_assert_eq!(codes.pending_len(), 0),
        AccessState::LockedOut => prop_assert_eq!(session.failed_attempts(), 3),
        _ => {}
    }

    for transition in locker.machine.history() {
        prop_assert!(
            transition.from.can_transition_to(&transition.to),
            "illegal transition {} -> {}",
            transition.from,
            transition.to
        );
    }

    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: No event sequence can break the session invariants.
    #[test]
    fn prop_invariants_hold(events in prop::collection::vec(any_event(), 1..80)) {
        let mut locker = Locker::new();

        for event in &events {
            apply(&mut locker, event);
            check_invariants(&locker)?;
        }
    }

    /// Property: A held key has the same effect as a single press.
    #[test]
    fn prop_hold_equals_press(
        prefix in prop::collection::vec(any_key(), 0..12),
        key in any_key(),
        ticks in 2u8..10,
    ) {
        let mut pressed = Locker::new();
        let mut held = Locker::new();

        for k in &prefix {
            apply(&mut pressed, &Event::Press(*k));
            apply(&mut held, &Event::Press(*k));
        }

        apply(&mut pressed, &Event::Press(key));
        apply(&mut held, &Event::Hold(key, ticks));

        prop_assert_eq!(pressed.machine.snapshot(), held.machine.snapshot());
        prop_assert_eq!(
            pressed.machine.session().codes().pending_digits(),
            held.machine.session().codes().pending_digits()
        );
    }

    /// Property: Only the correct code retrieves a stored item.
    #[test]
    fn prop_only_stored_code_opens(
        stored in prop::collection::vec(0u8..=9, CODE_LENGTH),
        guess in prop::collection::vec(0u8..=9, CODE_LENGTH),
    ) {
        let to_str = |digits: &[u8]| digits.iter().map(|d| char::from(b'0' + d)).collect::<String>();

        let mut locker = Locker::new();
        locker.store(&to_str(stored.as_slice()));

        locker.press(RawKey::A);
        locker.press_keys(&to_str(guess.as_slice()));
        locker.press(RawKey::Hash);

        if guess == stored {
            prop_assert_eq!(locker.state(), AccessState::Actuating);
            prop_assert!(!locker.machine.session().occupied());
        } else {
            prop_assert_eq!(locker.state(), AccessState::InvalidCode);
            prop_assert!(locker.machine.session().occupied());
        }
    }
}
