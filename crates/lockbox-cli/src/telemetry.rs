//! Telemetry sink printing one JSON object per line.

use std::io::Write;

use lockbox_hardware::{HardwareError, Result, TelemetryEvent, TelemetrySink};

pub struct JsonLinesTelemetry<W> {
    out: W,
}

impl<W: Write> JsonLinesTelemetry<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> TelemetrySink for JsonLinesTelemetry<W> {
    fn emit(&mut self, event: &TelemetryEvent) -> Result<()> {
        let line = serde_json::to_string(event)
            .map_err(|e| HardwareError::other(format!("telemetry encode: {e}")))?;

        writeln!(self.out, "{line}")
            .and_then(|()| self.out.flush())
            .map_err(|e| HardwareError::communication(format!("telemetry write: {e}")))
    }
}
