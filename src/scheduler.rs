//! Poll scheduler state machine.
//!
//! [`Monitor`] is the single long-lived context object pairing the poll state
//! with the bus session. Time is supplied from outside: a caller invokes
//! [`Monitor::tick`] once per period, either from its own loop or through
//! [`runner`](crate::runner) on hosted targets.

use embedded_hal::i2c::I2c;

use crate::bus::BusProvider;
use crate::config::Config;
use crate::device::Cps120;
use crate::error::{Error, Result};
use crate::interface::Cps120Interface;
use crate::interface::i2c::I2cInterface;
use crate::report::{Panel, ReportSink, Stage};

/// Lifecycle of the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollState {
    /// Nothing has been attempted yet.
    Uninitialized,
    /// Discovery, connection and start handshake are in progress.
    Initializing,
    /// Ticks read the sensor.
    Running,
    /// Initialization failed or shutdown was requested. Terminal.
    Stopped,
}

/// Outcome of one [`Monitor::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tick {
    /// A reading was decoded and delivered.
    Reported,
    /// The read failed and an error panel was delivered.
    Failed,
    /// The monitor is not running; nothing was read or delivered.
    Idle,
}

/// Owner of the poll state and the bus session.
pub struct Monitor<IFACE> {
    config: Config,
    state: PollState,
    session: Option<Cps120<IFACE>>,
}

impl<IFACE> Monitor<IFACE> {
    /// Creates an uninitialized monitor.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: PollState::Uninitialized,
            session: None,
        }
    }

    /// Current poll state.
    pub fn state(&self) -> PollState {
        self.state
    }

    /// Configuration used to open the session.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The active session, if any.
    pub fn session(&self) -> Option<&Cps120<IFACE>> {
        self.session.as_ref()
    }

    /// Stops polling and closes the session.
    ///
    /// Returns the released handle the first time a session is closed.
    pub fn shutdown(&mut self) -> Option<IFACE> {
        self.state = PollState::Stopped;
        let interface = self.session.as_mut().and_then(Cps120::close);
        self.session = None;
        if interface.is_some() {
            info!("poll loop stopped");
        }
        interface
    }
}

impl<I2C> Monitor<I2cInterface<I2C>>
where
    I2C: I2c,
{
    /// Opens the sensor through `provider` and starts conversions.
    ///
    /// On failure the reason is delivered to `sink` once and the monitor stops
    /// for good.
    pub fn initialize<P, S>(&mut self, provider: &mut P, sink: &mut S) -> Result<(), I2C::Error>
    where
        P: BusProvider<Bus = I2C>,
        S: ReportSink,
    {
        if self.state != PollState::Uninitialized {
            return Err(Error::NotReady);
        }
        self.state = PollState::Initializing;

        match Cps120::open(provider, self.config) {
            Ok(session) => self.handshake(session, sink),
            Err(err) => Err(self.fail(Stage::Open, err, sink)),
        }
    }
}

impl<IFACE, CommE> Monitor<IFACE>
where
    IFACE: Cps120Interface<Error = CommE>,
    CommE: core::fmt::Debug,
{
    /// Starts conversions on an already opened session.
    pub fn begin<S>(&mut self, session: Cps120<IFACE>, sink: &mut S) -> Result<(), CommE>
    where
        S: ReportSink,
    {
        if self.state != PollState::Uninitialized {
            return Err(Error::NotReady);
        }
        self.state = PollState::Initializing;
        self.config = *session.config();
        self.handshake(session, sink)
    }

    /// Runs one read-decode-report cycle.
    ///
    /// A failed read is reported and leaves the monitor running.
    pub fn tick<S>(&mut self, sink: &mut S) -> Tick
    where
        S: ReportSink,
    {
        if self.state != PollState::Running {
            return Tick::Idle;
        }
        let Some(session) = self.session.as_mut() else {
            return Tick::Idle;
        };

        match session.read() {
            Ok(reading) => {
                sink.display(Panel::from_reading(&reading));
                Tick::Reported
            }
            Err(err) => {
                warn!("sensor read failed");
                sink.display(Panel::from_failure(Stage::Read, &err));
                Tick::Failed
            }
        }
    }

    fn handshake<S>(&mut self, mut session: Cps120<IFACE>, sink: &mut S) -> Result<(), CommE>
    where
        S: ReportSink,
    {
        if let Err(err) = session.start() {
            session.close();
            return Err(self.fail(Stage::Start, err, sink));
        }

        self.session = Some(session);
        self.state = PollState::Running;
        info!("poll loop running");
        Ok(())
    }

    fn fail<S>(&mut self, stage: Stage, err: Error<CommE>, sink: &mut S) -> Error<CommE>
    where
        S: ReportSink,
    {
        error!("initialization failed during {:?}", stage);
        self.state = PollState::Stopped;
        sink.display(Panel::from_failure(stage, &err));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::ControllerId;
    use crate::params::BusSpeed;
    use crate::report::{PRESSURE_ERROR, STATUS_RUNNING};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTransaction};

    const ADDR: u8 = 0x28;

    struct MockProvider {
        controllers: &'static [&'static str],
        bus: Option<I2cMock>,
    }

    impl BusProvider for MockProvider {
        type Bus = I2cMock;
        type Controllers = heapless::Vec<ControllerId, 4>;

        fn controllers(&mut self) -> Self::Controllers {
            self.controllers
                .iter()
                .filter_map(|id| ControllerId::new(id))
                .collect()
        }

        fn connect(&mut self, _: &ControllerId, _: u8, _: BusSpeed) -> Option<Self::Bus> {
            self.bus.take()
        }
    }

    #[derive(Default)]
    struct Screen {
        panels: heapless::Vec<Panel, 8>,
    }

    impl ReportSink for Screen {
        fn display(&mut self, panel: Panel) {
            self.panels.push(panel).unwrap();
        }
    }

    fn start() -> I2cTransaction {
        I2cTransaction::write(ADDR, vec![0x80])
    }

    fn frame(bytes: [u8; 4]) -> I2cTransaction {
        I2cTransaction::write_read(ADDR, vec![0x00], bytes.to_vec())
    }

    #[test]
    fn initialize_reaches_running() {
        let expectations = [start()];
        let mut i2c = I2cMock::new(&expectations);
        let mut provider = MockProvider {
            controllers: &["I2C1"],
            bus: Some(i2c.clone()),
        };
        let mut screen = Screen::default();
        let mut monitor = Monitor::new(Config::default());
        assert_eq!(monitor.state(), PollState::Uninitialized);

        monitor.initialize(&mut provider, &mut screen).unwrap();
        assert_eq!(monitor.state(), PollState::Running);
        assert!(screen.panels.is_empty());

        monitor.shutdown();
        i2c.done();
    }

    #[test]
    fn initialize_without_controller_stops_and_reports_once() {
        let mut provider = MockProvider {
            controllers: &[],
            bus: None,
        };
        let mut screen = Screen::default();
        let mut monitor = Monitor::<I2cInterface<I2cMock>>::new(Config::default());

        let err = monitor.initialize(&mut provider, &mut screen).unwrap_err();
        assert_eq!(err, Error::NoControllerFound);
        assert_eq!(monitor.state(), PollState::Stopped);
        assert_eq!(screen.panels.len(), 1);
        assert_eq!(
            screen.panels[0].status.as_str(),
            "No I2C controllers were found on the system"
        );

        assert_eq!(monitor.tick(&mut screen), Tick::Idle);
        assert_eq!(screen.panels.len(), 1);
    }

    #[test]
    fn initialize_with_claimed_address_names_address_and_controller() {
        let mut provider = MockProvider {
            controllers: &["I2C1"],
            bus: None,
        };
        let mut screen = Screen::default();
        let mut monitor = Monitor::<I2cInterface<I2cMock>>::new(Config::default());

        let err = monitor.initialize(&mut provider, &mut screen).unwrap_err();
        assert!(matches!(err, Error::AddressInUse { address: ADDR, .. }));
        assert_eq!(monitor.state(), PollState::Stopped);

        let status = screen.panels[0].status.as_str();
        assert!(status.contains("0x28"));
        assert!(status.contains("I2C1"));
    }

    #[test]
    fn start_failure_stops_before_polling() {
        let expectations = [start().with_error(ErrorKind::Other)];
        let mut i2c = I2cMock::new(&expectations);
        let mut provider = MockProvider {
            controllers: &["I2C1"],
            bus: Some(i2c.clone()),
        };
        let mut screen = Screen::default();
        let mut monitor = Monitor::new(Config::default());

        let err = monitor.initialize(&mut provider, &mut screen).unwrap_err();
        assert_eq!(err, Error::Communication(ErrorKind::Other));
        assert_eq!(monitor.state(), PollState::Stopped);
        assert!(monitor.session().is_none());
        assert_eq!(
            screen.panels[0].status.as_str(),
            "Failed to communicate with device: Other"
        );
        assert_eq!(monitor.tick(&mut screen), Tick::Idle);
        i2c.done();
    }

    #[test]
    fn initialize_is_not_repeatable() {
        let mut provider = MockProvider {
            controllers: &[],
            bus: None,
        };
        let mut screen = Screen::default();
        let mut monitor = Monitor::<I2cInterface<I2cMock>>::new(Config::default());
        monitor.initialize(&mut provider, &mut screen).unwrap_err();

        assert_eq!(
            monitor.initialize(&mut provider, &mut screen),
            Err(Error::NotReady)
        );
        assert_eq!(screen.panels.len(), 1);
    }

    #[test]
    fn read_failure_is_reported_and_polling_resumes() {
        let expectations = [
            start(),
            frame([0x20, 0x00, 0x80, 0x00]),
            frame([0; 4]).with_error(ErrorKind::Other),
            frame([0x20, 0x00, 0x80, 0x00]),
        ];
        let mut i2c = I2cMock::new(&expectations);
        let session = Cps120::new_i2c(
            i2c.clone(),
            ControllerId::new("I2C1").unwrap(),
            Config::default(),
        );
        let mut screen = Screen::default();
        let mut monitor = Monitor::new(Config::default());
        monitor.begin(session, &mut screen).unwrap();

        assert_eq!(monitor.tick(&mut screen), Tick::Reported);
        assert_eq!(monitor.tick(&mut screen), Tick::Failed);
        assert_eq!(monitor.state(), PollState::Running);
        assert_eq!(monitor.tick(&mut screen), Tick::Reported);

        assert_eq!(screen.panels.len(), 3);
        assert_eq!(screen.panels[0].status.as_str(), STATUS_RUNNING);
        assert_eq!(
            screen.panels[0].pressure.as_str(),
            "Digital Pressure (kPa): 75.00"
        );
        assert_eq!(screen.panels[1].pressure.as_str(), PRESSURE_ERROR);
        assert_eq!(
            screen.panels[1].status.as_str(),
            "Failed to read from Pressure and Temperature Sensor: Other"
        );
        assert_eq!(screen.panels[2], screen.panels[0]);

        monitor.shutdown();
        i2c.done();
    }

    #[test]
    fn shutdown_closes_session_once() {
        let expectations = [start()];
        let mut i2c = I2cMock::new(&expectations);
        let session = Cps120::new_i2c(
            i2c.clone(),
            ControllerId::new("I2C1").unwrap(),
            Config::default(),
        );
        let mut screen = Screen::default();
        let mut monitor = Monitor::new(Config::default());
        monitor.begin(session, &mut screen).unwrap();

        assert!(monitor.shutdown().is_some());
        assert!(monitor.shutdown().is_none());
        assert_eq!(monitor.state(), PollState::Stopped);
        assert_eq!(monitor.tick(&mut screen), Tick::Idle);
        assert!(screen.panels.is_empty());
        i2c.done();
    }
}
