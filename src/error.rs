//! Error handling primitives for the CPS120 driver.

use crate::bus::ControllerId;

/// Crate-wide result type alias.
pub type Result<T, E> = core::result::Result<T, Error<E>>;

/// Error variants produced by the driver.
///
/// The `Display` rendering of each variant is the status text shown to the
/// operator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error<E>
where
    E: core::fmt::Debug,
{
    /// Controller discovery returned nothing.
    #[error("No I2C controllers were found on the system")]
    NoControllerFound,
    /// The sensor address is already claimed on the selected controller.
    #[error(
        "Slave address {address:#04x} on I2C controller {controller} is currently in use by \
         another application. Please ensure that no other applications are using I2C."
    )]
    AddressInUse {
        /// Requested 7-bit address.
        address: u8,
        /// Controller the address was requested on.
        controller: ControllerId,
    },
    /// Any error reported by the underlying bus interface.
    #[error("{0:?}")]
    Communication(E),
    /// The provided configuration parameters are invalid.
    #[error("Invalid sensor configuration")]
    InvalidConfig,
    /// The session has not completed its start handshake or is closed.
    #[error("Sensor session is not ready")]
    NotReady,
}

impl<E> From<E> for Error<E>
where
    E: core::fmt::Debug,
{
    fn from(err: E) -> Self {
        Self::Communication(err)
    }
}
