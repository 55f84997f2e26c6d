//! Strongly typed parameter enumerations for the CPS120 driver.
//!
//! These enums map directly to datasheet encodings and bus settings used across
//! [`Config`](crate::config::Config) and the session APIs. Prefer these types
//! over raw integers to keep configuration values valid and explicit.
//!
//! # Examples
//!
//! ```rust
//! use cps120::params::{BusSpeed, ByteMerge};
//!
//! let speed = BusSpeed::Fast;
//! let merge = ByteMerge::Legacy;
//! assert_eq!(speed.hz(), 400_000);
//! let _ = merge;
//! ```

use modular_bitfield::prelude::Specifier;

/// Two-wire bus clock selections supported by the sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusSpeed {
    /// Standard mode, 100 kHz.
    Standard,
    /// Fast mode, 400 kHz.
    Fast,
}

impl BusSpeed {
    /// Returns the bus clock in hertz.
    pub const fn hz(self) -> u32 {
        match self {
            Self::Standard => 100_000,
            Self::Fast => 400_000,
        }
    }
}

/// Data status bits reported in the two most significant bits of the first
/// data byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Specifier)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
#[bits = 2]
pub enum DataStatus {
    /// Normal operation, the frame holds a fresh conversion.
    Valid = 0b00,
    /// The sensor is in command mode.
    CommandMode = 0b01,
    /// The frame was already fetched since the last conversion.
    Stale = 0b10,
    /// The sensor flagged a diagnostic condition.
    Diagnostic = 0b11,
}

/// Where the masked bits of the fourth data byte are merged during decoding.
///
/// Both layouts exist in deployed code for this sensor and the correct one has
/// not been confirmed by the system's owner. `Legacy` keeps the long-standing
/// behaviour and stays the default until it is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ByteMerge {
    /// `byte3 & 0xFC` is ORed into the pressure code; temperature uses
    /// `byte2 * 256` only.
    #[default]
    Legacy,
    /// `byte3 & 0xFC` completes the temperature code, leaving pressure intact.
    Datasheet,
}
