//! Manually advanced clock.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// A clock that only moves when told to.
///
/// `sleep` advances the clock instead of blocking, so a full unlock pulse
/// train or a 60 second lockout completes instantly under test.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lockbox_hardware::mock::ManualClock;
/// use lockbox_hardware::traits::Clock;
///
/// let clock = ManualClock::new();
/// let start = clock.now();
///
/// clock.sleep(Duration::from_millis(20));
/// clock.advance(Duration::from_secs(1));
///
/// assert_eq!(clock.now() - start, Duration::from_millis(1020));
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward by `duration`.
    pub fn advance(&self, duration: Duration) {
        *self.lock() += duration;
    }

    fn lock(&self) -> MutexGuard<'_, Instant> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.lock()
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}
