//! Bus interface abstraction for the CPS120 driver.

pub mod i2c;

/// Abstraction over the low-level bus access required by the driver.
///
/// The sensor has no writable register file: it accepts raw command bytes and
/// returns its data frame after a register selector.
pub trait Cps120Interface {
    /// Error type produced by the concrete bus implementation.
    type Error: core::fmt::Debug;

    /// Writes raw bytes to the device.
    fn write(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error>;

    /// Writes `data` and then fills `buf` without releasing the bus in between.
    fn write_read(&mut self, data: &[u8], buf: &mut [u8]) -> core::result::Result<(), Self::Error>;
}
