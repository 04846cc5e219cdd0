//! Recording sinks for telemetry and presentation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use lockbox_core::SessionSnapshot;

use crate::{
    HardwareError, Result,
    traits::{PresentationSink, TelemetrySink},
    types::{TelemetryEvent, TelemetryKind},
};

#[derive(Debug)]
struct Recorder<T> {
    items: Vec<T>,
    failing: bool,
}

impl<T> Default for Recorder<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            failing: false,
        }
    }
}

fn lock<T>(shared: &Mutex<Recorder<T>>) -> MutexGuard<'_, Recorder<T>> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Telemetry sink that keeps every event in memory.
///
/// Can be switched into a failing mode to check that delivery failures do not
/// disturb the access flow.
#[derive(Debug, Clone, Default)]
pub struct RecordingTelemetry {
    inner: Arc<Mutex<Recorder<TelemetryEvent>>>,
}

impl RecordingTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered so far, oldest first.
    pub fn events(&self) -> Vec<TelemetryEvent> {
        lock(&self.inner).items.clone()
    }

    /// Kinds of the events delivered so far, oldest first.
    pub fn kinds(&self) -> Vec<TelemetryKind> {
        lock(&self.inner).items.iter().map(|e| e.kind).collect()
    }

    /// Make subsequent deliveries fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        lock(&self.inner).failing = failing;
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn emit(&mut self, event: &TelemetryEvent) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.failing {
            return Err(HardwareError::communication("telemetry link down"));
        }
        inner.items.push(event.clone());
        Ok(())
    }
}

/// Presentation sink that keeps every rendered snapshot in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresentation {
    inner: Arc<Mutex<Recorder<SessionSnapshot>>>,
}

impl RecordingPresentation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots rendered so far, oldest first.
    pub fn frames(&self) -> Vec<SessionSnapshot> {
        lock(&self.inner).items.clone()
    }

    /// Most recently rendered snapshot.
    pub fn last_frame(&self) -> Option<SessionSnapshot> {
        lock(&self.inner).items.last().cloned()
    }

    /// Make subsequent renders fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        lock(&self.inner).failing = failing;
    }
}

impl PresentationSink for RecordingPresentation {
    fn render(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        let mut inner = lock(&self.inner);
        if inner.failing {
            return Err(HardwareError::communication("display not responding"));
        }
        inner.items.push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockbox_core::{AccessState, LockPosition};

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            state: AccessState::Idle,
            occupied: false,
            operation: None,
            pending_len: 0,
            failed_attempts: 0,
            reopen_requested: false,
            sensor_position: LockPosition::Closed,
        }
    }

    #[test]
    fn test_telemetry_records_events() {
        let mut sink = RecordingTelemetry::new();
        let observer = sink.clone();

        sink.emit(&TelemetryEvent::new(TelemetryKind::Closed)).unwrap();

        assert_eq!(observer.kinds(), vec![TelemetryKind::Closed]);
    }

    #[test]
    fn test_failing_telemetry_drops_event() {
        let mut sink = RecordingTelemetry::new();
        sink.set_failing(true);

        assert!(sink.emit(&TelemetryEvent::new(TelemetryKind::Alert)).is_err());
        assert!(sink.events().is_empty());
    }

    #[test]
    fn test_presentation_records_frames() {
        let mut sink = RecordingPresentation::new();
        assert!(sink.last_frame().is_none());

        sink.render(&snapshot()).unwrap();

        assert_eq!(sink.frames().len(), 1);
        assert_eq!(sink.last_frame(), Some(snapshot()));
    }

    #[test]
    fn test_failing_presentation() {
        let mut sink = RecordingPresentation::new();
        sink.set_failing(true);
        assert!(sink.render(&snapshot()).is_err());
        assert!(sink.frames().is_empty());
    }
}
