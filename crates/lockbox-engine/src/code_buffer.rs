//! Storage for the code being typed and the code that locks the compartment.

use std::fmt;

use lockbox_core::{Digit, constants::CODE_LENGTH};
use subtle::ConstantTimeEq;
use tracing::debug;

/// Holds the in-progress code and the last committed code.
///
/// The pending code never exceeds [`CODE_LENGTH`] digits. The committed code
/// is either empty or a full code copied from the pending buffer.
///
/// # Security
/// `matches_committed` compares in constant time, and the `Debug` output shows
/// only lengths, never digits.
///
/// # Examples
///
/// ```
/// use lockbox_core::Digit;
/// use lockbox_engine::CodeBuffer;
///
/// let mut codes = CodeBuffer::new();
/// for d in [1, 2, 3, 4, 5, 6] {
///     assert!(codes.append(Digit::new(d).unwrap()));
/// }
/// assert!(codes.is_complete());
/// assert!(!codes.append(Digit::new(7).unwrap()));
///
/// codes.commit();
/// assert!(codes.matches_committed());
/// ```
#[derive(Clone, Default)]
pub struct CodeBuffer {
    pending: Vec<u8>,
    committed: Vec<u8>,
}

impl CodeBuffer {
    pub fn new() -> Self {
        Self {
            pending: Vec::with_capacity(CODE_LENGTH),
            committed: Vec::with_capacity(CODE_LENGTH),
        }
    }

    /// Append a digit to the pending code.
    ///
    /// Returns `false` without changing anything when the code is already full.
    pub fn append(&mut self, digit: Digit) -> bool {
        if self.pending.len() >= CODE_LENGTH {
            debug!("code buffer full, rejecting digit");
            return false;
        }
        self.pending.push(digit.as_u8());
        true
    }

    /// Remove the last pending digit. Returns `false` if there was none.
    pub fn remove_last(&mut self) -> bool {
        self.pending.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Copy the pending code into the committed slot.
    pub fn commit(&mut self) {
        self.committed.clone_from(&self.pending);
    }

    /// Forget the committed code once the stored item has been picked up.
    pub fn discard_committed(&mut self) {
        self.committed.clear();
    }

    pub fn matches_committed(&self) -> bool {
        self.pending
            .as_slice()
            .ct_eq(self.committed.as_slice())
            .into()
    }

    pub fn is_complete(&self) -> bool {
        self.pending.len() == CODE_LENGTH
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending_digits(&self) -> &[u8] {
        &self.pending
    }

    pub fn committed_digits(&self) -> &[u8] {
        &self.committed
    }

    pub fn has_committed(&self) -> bool {
        !self.committed.is_empty()
    }
}

impl fmt::Debug for CodeBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeBuffer")
            .field("pending_len", &self.pending.len())
            .field("committed", &self.has_committed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn fill(codes: &mut CodeBuffer, digits: &[u8]) {
        for &d in digits {
            codes.append(Digit::new(d).unwrap());
        }
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let codes = CodeBuffer::new();
        assert_eq!(codes.pending_len(), 0);
        assert!(!codes.has_committed());
        assert!(!codes.is_complete());
    }

    #[test]
    fn test_seventh_digit_rejected() {
        let mut codes = CodeBuffer::new();
        fill(&mut codes, &[1, 2, 3, 4, 5, 6]);

        assert!(!codes.append(Digit::new(7).unwrap()));
        assert_eq!(codes.pending_digits(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_remove_last_on_empty_is_noop() {
        let mut codes = CodeBuffer::new();
        assert!(!codes.remove_last());
        assert_eq!(codes.pending_len(), 0);
    }

    #[test]
    fn test_remove_last() {
        let mut codes = CodeBuffer::new();
        fill(&mut codes, &[4, 2]);

        assert!(codes.remove_last());
        assert_eq!(codes.pending_digits(), &[4]);
    }

    #[test]
    fn test_commit_copies_pending() {
        let mut codes = CodeBuffer::new();
        fill(&mut codes, &[1, 2, 3, 4, 5, 6]);
        codes.commit();
        codes.clear();

        assert_eq!(codes.committed_digits(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(codes.pending_len(), 0);
    }

    #[test]
    fn test_match_is_exact() {
        let mut codes = CodeBuffer::new();
        fill(&mut codes, &[1, 2, 3, 4, 5, 6]);
        codes.commit();
        codes.clear();

        fill(&mut codes, &[1, 2, 3, 4, 5]);
        assert!(!codes.matches_committed(), "prefix must not match");

        fill(&mut codes, &[7]);
        assert!(!codes.matches_committed());

        codes.remove_last();
        fill(&mut codes, &[6]);
        assert!(codes.matches_committed());
    }

    #[test]
    fn test_discard_committed() {
        let mut codes = CodeBuffer::new();
        fill(&mut codes, &[9, 9, 9, 9, 9, 9]);
        codes.commit();
        codes.discard_committed();

        assert!(!codes.has_committed());
    }

    #[test]
    fn test_debug_hides_digits() {
        let mut codes = CodeBuffer::new();
        fill(&mut codes, &[8, 6, 7, 5, 3, 0]);
        codes.commit();

        let debug = format!("{codes:?}");
        assert!(!debug.contains("867530"));
        assert!(!debug.contains('8'));
        assert!(debug.contains("pending_len: 6"));
    }

    proptest! {
        #[test]
        fn prop_pending_never_exceeds_code_length(
            ops in prop::collection::vec(prop::option::of(0u8..=9), 0..64)
        ) {
            let mut codes = CodeBuffer::new();
            for op in ops {
                match op {
                    Some(d) => {
                        let before = codes.pending_len();
                        let accepted = codes.append(Digit::new(d).unwrap());
                        prop_assert_eq!(accepted, before < CODE_LENGTH);
                    }
                    None => {
                        let before = codes.pending_len();
                        let removed = codes.remove_last();
                        prop_assert_eq!(removed, before > 0);
                    }
                }
                prop_assert!(codes.pending_len() <= CODE_LENGTH);
            }
        }
    }
}
