//! Bus session for one CPS120 sensor.

use embedded_hal::i2c::I2c;

use crate::bus::{BusProvider, ControllerId, discover};
use crate::codec::{Reading, decode_with};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::interface::Cps120Interface;
use crate::interface::i2c::I2cInterface;
use crate::params::{BusSpeed, DataStatus};
use crate::registers::{DATA_FRAME_LEN, RawFrame, REG_PRESSURE, START_COMMAND};

/// Lifecycle of a [`Cps120`] session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// The address is claimed but conversions have not been started.
    Open,
    /// The start command was accepted; reads are allowed.
    Ready,
    /// The handle has been released.
    Closed,
}

/// Exclusive session on the sensor's bus address.
pub struct Cps120<IFACE> {
    interface: Option<IFACE>,
    controller: ControllerId,
    config: Config,
    state: SessionState,
}

impl<IFACE> Cps120<IFACE> {
    // ==================================================================
    // == Session Construction & Ownership ==============================
    // ==================================================================
    /// Adopts an interface that is already connected to the sensor.
    pub fn new(interface: IFACE, controller: ControllerId, config: Config) -> Self {
        Self {
            interface: Some(interface),
            controller,
            config,
            state: SessionState::Open,
        }
    }

    /// Controller this session was opened on.
    pub fn controller(&self) -> &ControllerId {
        &self.controller
    }

    /// Target device address.
    pub fn address(&self) -> u8 {
        self.config.address
    }

    /// Bus clock the session was opened with.
    pub fn speed(&self) -> BusSpeed {
        self.config.speed
    }

    /// Returns a shared reference to the active configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Releases the underlying handle.
    ///
    /// The first call returns the handle; later calls return `None`.
    pub fn close(&mut self) -> Option<IFACE> {
        let interface = self.interface.take()?;
        self.state = SessionState::Closed;
        info!(
            "closed session on {} address {:#x}",
            self.controller,
            self.config.address
        );
        Some(interface)
    }
}

impl<I2C> Cps120<I2cInterface<I2C>>
where
    I2C: I2c,
{
    // ==================================================================
    // == I2C Convenience Constructors ==================================
    // ==================================================================
    /// Discovers the first controller and claims the configured address on it.
    pub fn open<P>(provider: &mut P, config: Config) -> Result<Self, I2C::Error>
    where
        P: BusProvider<Bus = I2C>,
    {
        config.validate().map_err(|_| Error::InvalidConfig)?;

        let controller = discover::<_, I2C::Error>(provider)?;
        let Some(i2c) = provider.connect(&controller, config.address, config.speed) else {
            return Err(Error::AddressInUse {
                address: config.address,
                controller,
            });
        };

        info!(
            "opened {} address {:#x} at {} Hz",
            controller,
            config.address,
            config.speed.hz()
        );
        Ok(Self::new_i2c(i2c, controller, config))
    }

    /// Convenience constructor for an already claimed I2C bus.
    pub fn new_i2c(i2c: I2C, controller: ControllerId, config: Config) -> Self {
        Self::new(I2cInterface::new(i2c, config.address), controller, config)
    }

    /// Closes the session and returns the I2C bus.
    pub fn close_i2c(&mut self) -> Option<I2C> {
        self.close().map(I2cInterface::release)
    }
}

impl<IFACE, CommE> Cps120<IFACE>
where
    IFACE: Cps120Interface<Error = CommE>,
    CommE: core::fmt::Debug,
{
    // ==================================================================
    // == Handshake & Data Acquisition ==================================
    // ==================================================================
    /// Sends the start command that begins conversions inside the sensor.
    pub fn start(&mut self) -> Result<(), CommE> {
        if self.state == SessionState::Closed {
            return Err(Error::NotReady);
        }

        self.interface()?.write(&[START_COMMAND])?;
        self.state = SessionState::Ready;
        debug!("start command accepted");
        Ok(())
    }

    /// Reads one raw data frame.
    pub fn read_raw(&mut self) -> Result<RawFrame, CommE> {
        if self.state != SessionState::Ready {
            return Err(Error::NotReady);
        }

        let mut raw = [0u8; DATA_FRAME_LEN];
        self.interface()?.write_read(&[REG_PRESSURE], &mut raw)?;

        let frame = RawFrame::from(raw);
        let status = frame.status();
        if status != DataStatus::Valid {
            warn!("sensor flagged frame status {:?}", status);
        }
        Ok(frame)
    }

    /// Reads and decodes one pressure/temperature sample.
    pub fn read(&mut self) -> Result<Reading, CommE> {
        let frame = self.read_raw()?;
        let reading = decode_with(frame.bytes(), self.config.byte_merge);
        trace!(
            "pressure {} kPa, temperature {} C",
            reading.pressure_kpa(),
            reading.temperature_celsius()
        );
        Ok(reading)
    }

    fn interface(&mut self) -> Result<&mut IFACE, CommE> {
        self.interface.as_mut().ok_or(Error::NotReady)
    }
}
