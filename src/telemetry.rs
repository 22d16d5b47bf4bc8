//! Driver-station style key/value status lines.
//!
//! Lines added during a cycle are held until [`Telemetry::update`] publishes
//! them as the new frame, replacing the previous one.

use alloc::{
    format,
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

pub trait Telemetry {
    fn add_data(&mut self, caption: &str, value: &dyn fmt::Display);
    fn update(&mut self);
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TelemetryBuffer {
    pending: Vec<(String, String)>,
    frame: Vec<(String, String)>,
    updates: u64,
}

impl TelemetryBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published frame.
    pub fn frame(&self) -> &[(String, String)] {
        &self.frame
    }

    /// Value of `caption` in the published frame, if present.
    pub fn get(&self, caption: &str) -> Option<&str> {
        self.frame
            .iter()
            .find(|(c, _)| c == caption)
            .map(|(_, v)| v.as_str())
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl Telemetry for TelemetryBuffer {
    fn add_data(&mut self, caption: &str, value: &dyn fmt::Display) {
        self.pending.push((caption.to_string(), format!("{value}")));
    }

    fn update(&mut self) {
        self.frame = core::mem::take(&mut self.pending);
        self.updates += 1;
    }
}

/// Publishes every frame through the `log` facade under the `telemetry` target.
#[derive(Default)]
pub struct LogTelemetry {
    buffer: TelemetryBuffer,
}

impl LogTelemetry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &TelemetryBuffer {
        &self.buffer
    }
}

impl Telemetry for LogTelemetry {
    fn add_data(&mut self, caption: &str, value: &dyn fmt::Display) {
        self.buffer.add_data(caption, value);
    }

    fn update(&mut self) {
        self.buffer.update();
        for (caption, value) in self.buffer.frame() {
            log::info!(target: "telemetry", "{caption}: {value}");
        }
    }
}
