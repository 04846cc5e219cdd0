//! Keypress classification.
//!
//! Maps raw keys from the 4×4 matrix keypad (and the alert button) to the
//! semantic actions the access state machine understands.

use lockbox_core::{Digit, RawKey};
use serde::{Deserialize, Serialize};

/// Which input caused an [`Action::Advance`].
///
/// Several transitions only accept a specific key, e.g. the code is confirmed
/// with `#` and the reopen option is `B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvanceTrigger {
    /// Menu key `A`.
    Menu,
    /// Reopen key `B`.
    Reopen,
    /// Confirm key `#`.
    Confirm,
    /// Issued by the controller itself on a sensor edge or when a timed
    /// window expires.
    Forced,
}

/// Semantic action derived from one key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Advance(AdvanceTrigger),
    Retreat,
    AppendDigit(Digit),
    DeleteDigit,
    Alert,
    None,
}

/// Classify a raw key. Total: every key maps to some action.
///
/// # Examples
///
/// ```
/// use lockbox_core::RawKey;
/// use lockbox_engine::{Action, AdvanceTrigger, classify};
///
/// assert_eq!(classify(RawKey::Hash), Action::Advance(AdvanceTrigger::Confirm));
/// assert_eq!(classify(RawKey::Star), Action::Retreat);
/// assert_eq!(classify(RawKey::C), Action::None);
/// ```
pub fn classify(key: RawKey) -> Action {
    match key {
        RawKey::Digit(d) => Action::AppendDigit(d),
        RawKey::A => Action::Advance(AdvanceTrigger::Menu),
        RawKey::B => Action::Advance(AdvanceTrigger::Reopen),
        RawKey::Hash => Action::Advance(AdvanceTrigger::Confirm),
        RawKey::Star => Action::Retreat,
        RawKey::D => Action::DeleteDigit,
        RawKey::Alert => Action::Alert,
        RawKey::C => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::constants::KEYPAD_MATRIX;
    use rstest::rstest;

    #[rstest]
    #[case(RawKey::A, Action::Advance(AdvanceTrigger::Menu))]
    #[case(RawKey::B, Action::Advance(AdvanceTrigger::Reopen))]
    #[case(RawKey::Hash, Action::Advance(AdvanceTrigger::Confirm))]
    #[case(RawKey::Star, Action::Retreat)]
    #[case(RawKey::D, Action::DeleteDigit)]
    #[case(RawKey::Alert, Action::Alert)]
    #[case(RawKey::C, Action::None)]
    fn test_classify_function_keys(#[case] key: RawKey, #[case] expected: Action) {
        assert_eq!(classify(key), expected);
    }

    #[test]
    fn test_classify_digits() {
        for d in 0..=9 {
            let digit = Digit::new(d).unwrap();
            assert_eq!(classify(RawKey::Digit(digit)), Action::AppendDigit(digit));
        }
    }

    #[test]
    fn test_every_matrix_key_classifies() {
        for c in KEYPAD_MATRIX.iter().flatten() {
            let key = RawKey::from_char(*c).unwrap();
            // Only the unassigned C key maps to nothing
            assert_eq!(classify(key) == Action::None, *c == 'C', "key {c}");
        }
    }
}
