//! Configuration primitives for the CPS120 driver.

use crate::params::{BusSpeed, ByteMerge};
use crate::registers::DEFAULT_ADDRESS;

/// Polling period of the read-decode-report cycle in milliseconds.
pub const POLL_PERIOD_MS: u32 = 100;

/// User-facing configuration for the CPS120 sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// 7-bit bus address of the sensor.
    pub address: u8,
    /// Bus clock selection.
    pub speed: BusSpeed,
    /// Byte-3 merge used when decoding frames.
    pub byte_merge: ByteMerge,
}

impl Config {
    /// Begins building a [`Config`] using the builder pattern.
    pub fn new() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    /// Checks whether this configuration is valid.
    pub fn validate(&self) -> core::result::Result<(), ConfigError> {
        match self.address {
            0x80..=u8::MAX => Err(ConfigError::AddressOutOfRange),
            0x00..=0x07 | 0x78..=0x7F => Err(ConfigError::ReservedAddress),
            _ => Ok(()),
        }
    }
}

/// Builder for [`Config`] allowing piecemeal construction.
#[derive(Debug, Clone, Copy)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Creates a new builder seeded with [`Config::default()`].
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    /// Overrides the device address.
    pub fn address(mut self, address: u8) -> Self {
        self.config.address = address;
        self
    }

    /// Overrides the bus clock.
    pub fn speed(mut self, speed: BusSpeed) -> Self {
        self.config.speed = speed;
        self
    }

    /// Selects the byte-3 merge used by the decoder.
    pub fn byte_merge(mut self, byte_merge: ByteMerge) -> Self {
        self.config.byte_merge = byte_merge;
        self
    }

    /// Finalizes the builder and returns the [`Config`].
    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            speed: BusSpeed::Fast,
            byte_merge: ByteMerge::Legacy,
        }
    }
}

/// Validation errors generated while verifying a [`Config`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The address does not fit in 7 bits.
    AddressOutOfRange,
    /// The address falls in a range the I2C bus reserves for special purposes.
    ReservedAddress,
}
