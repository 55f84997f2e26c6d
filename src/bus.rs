//! Bus controller discovery and connection capabilities.
//!
//! Finding a controller and claiming an address on it is platform specific.
//! The driver only needs the two operations captured by [`BusProvider`].

use core::fmt;

use crate::error::{Error, Result};
use crate::params::BusSpeed;

/// Maximum length of a controller identifier in bytes.
pub const CONTROLLER_ID_CAPACITY: usize = 128;

/// Identifier of one bus controller, as reported by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerId(heapless::String<CONTROLLER_ID_CAPACITY>);

impl ControllerId {
    /// Creates an identifier, or `None` when `id` exceeds
    /// [`CONTROLLER_ID_CAPACITY`].
    pub fn new(id: &str) -> Option<Self> {
        heapless::String::try_from(id).ok().map(Self)
    }

    /// Returns the identifier text.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ControllerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ControllerId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str());
    }
}

/// Platform capability that enumerates controllers and claims device addresses.
pub trait BusProvider {
    /// Handle returned for a claimed address.
    type Bus;
    /// Collection of discovered controllers.
    type Controllers: IntoIterator<Item = ControllerId>;

    /// Enumerates the bus controllers present on the system.
    fn controllers(&mut self) -> Self::Controllers;

    /// Claims `address` on `controller` at the given bus speed.
    ///
    /// Returns `None` when another client already owns the address.
    fn connect(
        &mut self,
        controller: &ControllerId,
        address: u8,
        speed: BusSpeed,
    ) -> Option<Self::Bus>;
}

/// Returns the first controller reported by `provider`.
pub fn discover<P, E>(provider: &mut P) -> Result<ControllerId, E>
where
    P: BusProvider,
    E: fmt::Debug,
{
    match provider.controllers().into_iter().next() {
        Some(controller) => {
            debug!("discovered bus controller {}", controller);
            Ok(controller)
        }
        None => Err(Error::NoControllerFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        ids: &'static [&'static str],
    }

    impl BusProvider for FixedProvider {
        type Bus = ();
        type Controllers = heapless::Vec<ControllerId, 4>;

        fn controllers(&mut self) -> Self::Controllers {
            self.ids.iter().filter_map(|id| ControllerId::new(id)).collect()
        }

        fn connect(&mut self, _: &ControllerId, _: u8, _: BusSpeed) -> Option<Self::Bus> {
            Some(())
        }
    }

    #[test]
    fn discover_picks_first_controller() {
        let mut provider = FixedProvider {
            ids: &["I2C1", "I2C2"],
        };
        let controller = discover::<_, ()>(&mut provider).unwrap();
        assert_eq!(controller.as_str(), "I2C1");
    }

    #[test]
    fn discover_without_controllers_fails() {
        let mut provider = FixedProvider { ids: &[] };
        assert_eq!(
            discover::<_, ()>(&mut provider),
            Err(Error::NoControllerFound)
        );
    }

    #[test]
    fn controller_id_rejects_oversized_text() {
        let long = [b'x'; CONTROLLER_ID_CAPACITY + 1];
        let long = core::str::from_utf8(&long).unwrap();
        assert!(ControllerId::new(long).is_none());
        assert!(ControllerId::new(&long[..CONTROLLER_ID_CAPACITY]).is_some());
    }
}
