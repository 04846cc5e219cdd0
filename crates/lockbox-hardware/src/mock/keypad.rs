//! Mock keypad implementation for testing and development.
//!
//! This module provides a simulated keypad that can be fed key presses
//! programmatically, from tests or from the simulator's stdin reader.

use lockbox_core::{Digit, RawKey};
use tokio::sync::mpsc;

use crate::{Result, traits::KeypadSource};

/// Mock keypad device for testing and development.
///
/// Each key sent through the [`MockKeypadHandle`] is reported as held for
/// exactly one poll and released on the next, so consecutive presses of the
/// same key are seen as separate presses by an edge-detecting caller.
///
/// # Examples
///
/// ```
/// use lockbox_core::RawKey;
/// use lockbox_hardware::mock::MockKeypad;
/// use lockbox_hardware::traits::KeypadSource;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> lockbox_hardware::Result<()> {
///     let (mut keypad, handle) = MockKeypad::new();
///
///     handle.send_key(RawKey::A).await?;
///     handle.send_key(RawKey::A).await?;
///
///     assert_eq!(keypad.poll_key(), Some(RawKey::A));
///     assert_eq!(keypad.poll_key(), None); // released
///     assert_eq!(keypad.poll_key(), Some(RawKey::A));
///     assert_eq!(keypad.poll_key(), None);
///
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockKeypad {
    /// Channel receiver for simulated input
    input_rx: mpsc::Receiver<RawKey>,

    /// Device name
    name: String,

    /// Whether the previous poll reported a key that must now be released
    release_pending: bool,
}

impl MockKeypad {
    /// Create a new mock keypad with the default name.
    ///
    /// Returns a tuple of (MockKeypad, MockKeypadHandle) where the handle
    /// can be used to simulate key presses.
    pub fn new() -> (Self, MockKeypadHandle) {
        Self::with_name("Mock Keypad".to_string())
    }

    /// Create a new mock keypad with a custom name.
    pub fn with_name(name: String) -> (Self, MockKeypadHandle) {
        let (input_tx, input_rx) = mpsc::channel(32);

        let keypad = Self {
            input_rx,
            name: name.clone(),
            release_pending: false,
        };

        let handle = MockKeypadHandle { input_tx, name };

        (keypad, handle)
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Default for MockKeypad {
    fn default() -> Self {
        Self::new().0
    }
}

impl KeypadSource for MockKeypad {
    fn poll_key(&mut self) -> Option<RawKey> {
        if self.release_pending {
            self.release_pending = false;
            return None;
        }

        let key = self.input_rx.try_recv().ok()?;
        self.release_pending = true;
        Some(key)
    }
}

/// Handle for controlling a mock keypad.
///
/// This handle allows programmatic control of the mock keypad by sending
/// key presses. It can be cloned and shared across tasks.
#[derive(Debug, Clone)]
pub struct MockKeypadHandle {
    /// Channel sender for simulated input
    input_tx: mpsc::Sender<RawKey>,

    /// Device name
    name: String,
}

impl MockKeypadHandle {
    /// Send a key press to the mock keypad.
    ///
    /// # Errors
    ///
    /// Returns an error if the keypad has been dropped and the channel is closed.
    pub async fn send_key(&self, key: RawKey) -> Result<()> {
        self.input_tx
            .send(key)
            .await
            .map_err(|_| crate::HardwareError::disconnected("Keypad input channel closed"))
    }

    /// Send a key press without waiting, for use outside an async context.
    ///
    /// # Errors
    ///
    /// Returns an error if the channel is closed or its buffer is full.
    pub fn try_send_key(&self, key: RawKey) -> Result<()> {
        self.input_tx.try_send(key).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                crate::HardwareError::communication("Keypad input buffer full")
            }
            mpsc::error::TrySendError::Closed(_) => {
                crate::HardwareError::disconnected("Keypad input channel closed")
            }
        })
    }

    /// Send a sequence of digit presses.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any digit is greater than 9
    /// - The keypad has been dropped and the channel is closed
    pub async fn send_digits(&self, digits: &[u8]) -> Result<()> {
        for &digit in digits {
            let digit = Digit::new(digit).map_err(|e| crate::HardwareError::other(e.to_string()))?;
            self.send_key(RawKey::Digit(digit)).await?;
        }
        Ok(())
    }

    /// Send a complete code followed by the confirm key (`#`).
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Any digit in the code is greater than 9
    /// - The keypad has been dropped and the channel is closed
    pub async fn send_code(&self, digits: &[u8]) -> Result<()> {
        self.send_digits(digits).await?;
        self.send_key(RawKey::Hash).await?;
        Ok(())
    }

    /// Number of sent keys the keypad has not reported yet.
    pub fn queued(&self) -> usize {
        self.input_tx.max_capacity() - self.input_tx.capacity()
    }

    /// Get the device name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
