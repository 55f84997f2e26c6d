//! Display payloads handed to the presentation layer.
//!
//! Every delivery is a complete [`Panel`]: the sink replaces whatever it showed
//! before with all four lines.

use core::fmt::{self, Write};

use crate::codec::Reading;

/// Capacity of one panel line in bytes.
pub const TEXT_CAPACITY: usize = 320;

/// One line of panel text.
pub type Text = heapless::String<TEXT_CAPACITY>;

/// Status line shown while readings arrive.
pub const STATUS_RUNNING: &str = "Status: Running";
/// Pressure line shown in place of a value after a failure.
pub const PRESSURE_ERROR: &str = "Digital Pressure: Error";
/// Celsius line shown in place of a value after a failure.
pub const CELSIUS_ERROR: &str = "Temperature in Celsius: Error";
/// Fahrenheit line shown in place of a value after a failure.
pub const FAHRENHEIT_ERROR: &str = "Temperature in Fahrenheit: Error";

/// Stage a reported failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// Discovery, connection or configuration.
    Open,
    /// Start command handshake.
    Start,
    /// Periodic data read.
    Read,
}

/// The four display lines of one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Pressure line.
    pub pressure: Text,
    /// Celsius line.
    pub celsius: Text,
    /// Fahrenheit line.
    pub fahrenheit: Text,
    /// Status line.
    pub status: Text,
}

impl Panel {
    /// Builds the panel for a successful reading, values to two decimals.
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            pressure: text(format_args!(
                "Digital Pressure (kPa): {:.2}",
                reading.pressure_kpa()
            )),
            celsius: text(format_args!(
                "Temperature in Celsius (°C): {:.2}",
                reading.temperature_celsius()
            )),
            fahrenheit: text(format_args!(
                "Temperature in Fahrenheit (°F): {:.2}",
                reading.temperature_fahrenheit()
            )),
            status: text(format_args!("{STATUS_RUNNING}")),
        }
    }

    /// Builds the panel for a failure at `stage`.
    pub fn from_failure(stage: Stage, detail: &dyn fmt::Display) -> Self {
        let status = match stage {
            Stage::Open => text(format_args!("{detail}")),
            Stage::Start => text(format_args!("Failed to communicate with device: {detail}")),
            Stage::Read => text(format_args!(
                "Failed to read from Pressure and Temperature Sensor: {detail}"
            )),
        };

        Self {
            pressure: text(format_args!("{PRESSURE_ERROR}")),
            celsius: text(format_args!("{CELSIUS_ERROR}")),
            fahrenheit: text(format_args!("{FAHRENHEIT_ERROR}")),
            status,
        }
    }

    /// Whether this panel carries a reading.
    pub fn is_running(&self) -> bool {
        self.status.as_str() == STATUS_RUNNING
    }
}

// Keeps the longest prefix that fits; the rest of the line is cut.
fn text(args: fmt::Arguments<'_>) -> Text {
    let mut line = Clip(Text::new());
    let _ = line.write_fmt(args);
    line.0
}

// Char-wise writer that stops at the first char past the capacity.
struct Clip(Text);

impl Write for Clip {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            self.0.push(c).map_err(|_| fmt::Error)?;
        }
        Ok(())
    }
}

/// Presentation layer receiving panels.
pub trait ReportSink {
    /// Replaces the displayed values with `panel`.
    fn display(&mut self, panel: Panel);
}

impl<F> ReportSink for F
where
    F: FnMut(Panel),
{
    fn display(&mut self, panel: Panel) {
        self(panel)
    }
}
