//! Register map and data frame layout for the CPS120 sensor.
#![allow(unused_parens)]

use modular_bitfield::prelude::*;

use crate::params::DataStatus;

/// Factory default 7-bit bus address.
pub const DEFAULT_ADDRESS: u8 = 0x28;
/// Register address selector written before every data read.
pub const REG_PRESSURE: u8 = 0x00;
/// Command byte that starts conversions inside the sensor.
pub const START_COMMAND: u8 = 0x80;
/// Number of bytes in one pressure/temperature data frame.
pub const DATA_FRAME_LEN: usize = 4;

/// Mask applied to byte 0 to recover the pressure high bits.
pub const PRESSURE_MSB_MASK: u8 = 0x3F;
/// Mask applied to byte 1 to recover the pressure low bits.
pub const PRESSURE_LSB_MASK: u8 = 0xFF;
/// Mask applied to byte 2 to recover the temperature high bits.
pub const TEMPERATURE_MSB_MASK: u8 = 0xFF;
/// Mask applied to byte 3 to recover the temperature low bits.
pub const TEMPERATURE_LSB_MASK: u8 = 0xFC;

/// Bitfield view of the first data byte.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressureMsb {
    // Pressure code bits 13:8 (bits 5:0).
    pub pressure_high: B6,
    // Data status (bits 7:6).
    pub status: DataStatus,
}

impl From<u8> for PressureMsb {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<PressureMsb> for u8 {
    fn from(value: PressureMsb) -> Self {
        value.into_bytes()[0]
    }
}

/// Bitfield view of the fourth data byte.
#[allow(unused_parens)]
#[bitfield]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureLsb {
    #[skip]
    __: B2,
    // Temperature code bits 7:2 (bits 7:2).
    pub temperature_low: B6,
}

impl From<u8> for TemperatureLsb {
    fn from(value: u8) -> Self {
        Self::from_bytes([value])
    }
}

impl From<TemperatureLsb> for u8 {
    fn from(value: TemperatureLsb) -> Self {
        value.into_bytes()[0]
    }
}

/// One raw pressure/temperature frame as read from [`REG_PRESSURE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawFrame(pub [u8; DATA_FRAME_LEN]);

impl RawFrame {
    /// Returns the status bits carried by the frame.
    pub fn status(&self) -> DataStatus {
        PressureMsb::from(self.0[0]).status()
    }

    /// Returns the raw bytes.
    pub const fn bytes(&self) -> [u8; DATA_FRAME_LEN] {
        self.0
    }
}

impl From<[u8; DATA_FRAME_LEN]> for RawFrame {
    fn from(value: [u8; DATA_FRAME_LEN]) -> Self {
        Self(value)
    }
}
