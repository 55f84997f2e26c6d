//! Raw frame to physical unit conversion.
//!
//! The constants below encode the sensor's fixed full-scale ranges: 30 kPa to
//! 120 kPa and -40 °C to 125 °C, each over a 14-bit code. They are protocol
//! constants, not calibration values.

use crate::params::ByteMerge;
use crate::registers::{
    DATA_FRAME_LEN,
    PRESSURE_LSB_MASK,
    PressureMsb,
    TEMPERATURE_MSB_MASK,
    TemperatureLsb,
};

/// Full-scale count of a 14-bit code.
pub const CODE_SPAN: f64 = 16_384.0;
/// Pressure span in kilopascals.
pub const PRESSURE_SPAN_KPA: f64 = 90.0;
/// Pressure at code zero in kilopascals.
pub const PRESSURE_OFFSET_KPA: f64 = 30.0;
/// Temperature span in degrees Celsius.
pub const TEMPERATURE_SPAN_C: f64 = 165.0;
/// Temperature at code zero in degrees Celsius.
pub const TEMPERATURE_OFFSET_C: f64 = -40.0;
/// Divisor that right-aligns the left-justified temperature code.
pub const TEMPERATURE_ALIGN: f64 = 4.0;

/// One decoded pressure and temperature sample.
///
/// Fahrenheit is derived from Celsius on demand and never stored.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Reading {
    pressure_kpa: f64,
    temperature_celsius: f64,
}

impl Reading {
    /// Creates a reading from physical values.
    pub const fn new(pressure_kpa: f64, temperature_celsius: f64) -> Self {
        Self {
            pressure_kpa,
            temperature_celsius,
        }
    }

    /// Pressure in kilopascals.
    pub const fn pressure_kpa(&self) -> f64 {
        self.pressure_kpa
    }

    /// Temperature in degrees Celsius.
    pub const fn temperature_celsius(&self) -> f64 {
        self.temperature_celsius
    }

    /// Temperature in degrees Fahrenheit.
    pub fn temperature_fahrenheit(&self) -> f64 {
        self.temperature_celsius * 1.8 + 32.0
    }
}

/// Unscaled codes recovered from a data frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawCodes {
    /// Pressure accumulator.
    pub pressure: u16,
    /// Temperature accumulator, still left-justified.
    pub temperature: u16,
}

/// Extracts the raw codes from a frame using the requested byte-3 merge.
pub fn raw_codes(raw: [u8; DATA_FRAME_LEN], merge: ByteMerge) -> RawCodes {
    let mut pressure = u16::from(PressureMsb::from(raw[0]).pressure_high()) * 256;
    pressure |= u16::from(raw[1] & PRESSURE_LSB_MASK);
    let mut temperature = u16::from(raw[2] & TEMPERATURE_MSB_MASK) * 256;

    let low = u16::from(TemperatureLsb::from(raw[3]).temperature_low()) << 2;
    match merge {
        ByteMerge::Legacy => pressure |= low,
        ByteMerge::Datasheet => temperature |= low,
    }

    RawCodes {
        pressure,
        temperature,
    }
}

/// Converts raw codes to physical units.
pub fn convert(codes: RawCodes) -> Reading {
    let pressure = (f64::from(codes.pressure) / CODE_SPAN) * PRESSURE_SPAN_KPA + PRESSURE_OFFSET_KPA;
    let celsius = ((f64::from(codes.temperature) / TEMPERATURE_ALIGN) / CODE_SPAN)
        * TEMPERATURE_SPAN_C
        + TEMPERATURE_OFFSET_C;
    Reading::new(pressure, celsius)
}

/// Decodes a frame with the default [`ByteMerge::Legacy`] layout.
///
/// Any input produces a reading; frame validity is the caller's concern.
pub fn decode(raw: [u8; DATA_FRAME_LEN]) -> Reading {
    decode_with(raw, ByteMerge::Legacy)
}

/// Decodes a frame with an explicit byte-3 merge.
pub fn decode_with(raw: [u8; DATA_FRAME_LEN], merge: ByteMerge) -> Reading {
    convert(raw_codes(raw, merge))
}
