//! I2C interface implementation built on top of `embedded-hal` `I2c`.

use embedded_hal::i2c::I2c;

use super::Cps120Interface;

/// I2C-based interface implementation bound to one device address.
///
/// Holding the bus by value (or through a `&mut`) is what keeps the
/// write-then-read sequence exclusive. A bus shared between drivers should be
/// handed over as an `embedded-hal-bus` device so the same guarantee holds.
pub struct I2cInterface<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cInterface<I2C> {
    /// Creates a new interface from the provided I2C bus and 7-bit address.
    pub const fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Returns the bound device address.
    pub const fn address(&self) -> u8 {
        self.address
    }

    /// Provides mutable access to the wrapped I2C bus.
    pub fn i2c_mut(&mut self) -> &mut I2C {
        &mut self.i2c
    }

    /// Consumes the interface and returns the owned I2C bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Cps120Interface for I2cInterface<I2C>
where
    I2C: I2c,
{
    type Error = I2C::Error;

    fn write(&mut self, data: &[u8]) -> core::result::Result<(), Self::Error> {
        self.i2c.write(self.address, data)
    }

    fn write_read(&mut self, data: &[u8], buf: &mut [u8]) -> core::result::Result<(), Self::Error> {
        if buf.is_empty() {
            return self.write(data);
        }

        self.i2c.write_read(self.address, data, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::I2cInterface;
    use crate::interface::Cps120Interface;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x28;

    #[test]
    fn write_targets_bound_address() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x80])];
        let mut i2c = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(i2c.clone(), ADDR);

        interface.write(&[0x80]).unwrap();
        i2c.done();
    }

    #[test]
    fn write_read_fills_buffer_in_one_transaction() {
        let expectations = [I2cTransaction::write_read(
            ADDR,
            vec![0x00],
            vec![0x1A, 0x2B, 0x3C, 0x4D],
        )];
        let mut i2c = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(i2c.clone(), ADDR);

        let mut buffer = [0u8; 4];
        interface.write_read(&[0x00], &mut buffer).unwrap();
        assert_eq!(buffer, [0x1A, 0x2B, 0x3C, 0x4D]);
        i2c.done();
    }

    #[test]
    fn write_read_with_empty_buffer_only_writes() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x00])];
        let mut i2c = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(i2c.clone(), ADDR);

        interface.write_read(&[0x00], &mut []).unwrap();
        i2c.done();
    }

    #[test]
    fn bus_errors_pass_through() {
        let expectations = [I2cTransaction::write(ADDR, vec![0x80]).with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let mut interface = I2cInterface::new(i2c.clone(), ADDR);

        assert_eq!(interface.write(&[0x80]), Err(ErrorKind::Other));
        i2c.done();
    }

    #[test]
    fn release_returns_bus() {
        let interface = I2cInterface::new(I2cMock::new(&[]), ADDR);
        assert_eq!(interface.address(), ADDR);

        let mut released = interface.release();
        released.done();
    }
}
