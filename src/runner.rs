//! Threaded poll loop for hosted targets.
//!
//! [`spawn`] moves a running [`Monitor`] onto a dedicated timer thread. Panels
//! travel to the sink's own context through a [`Mailbox`] holding the latest
//! undelivered panel; a newer panel replaces an older one and the timer thread
//! never waits for the sink.
//!
//! No timeout guards the bus transaction itself. A transaction that never
//! returns stalls every later tick and makes [`Poller::stop`] wait for it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::config::POLL_PERIOD_MS;
use crate::error::{Error, Result};
use crate::interface::Cps120Interface;
use crate::report::{Panel, ReportSink};
use crate::scheduler::{Monitor, PollState};

/// Fixed tick period.
pub const POLL_PERIOD: Duration = Duration::from_millis(POLL_PERIOD_MS as u64);

#[derive(Default)]
struct Pending {
    panel: Option<Panel>,
    closed: bool,
}

#[derive(Default)]
struct Slot {
    pending: Mutex<Pending>,
    ready: Condvar,
}

impl Slot {
    // A panicking sink cannot leave `Pending` half-written.
    fn lock(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Receiving end of the panel handoff, owned by the sink's context.
pub struct Mailbox {
    slot: Arc<Slot>,
}

impl Mailbox {
    /// Delivers the waiting panel, if any, to `sink` without blocking.
    ///
    /// Returns `false` once the poll thread is gone and nothing is left.
    pub fn drain_into<S: ReportSink>(&self, sink: &mut S) -> bool {
        let (panel, closed) = {
            let mut pending = self.slot.lock();
            (pending.panel.take(), pending.closed)
        };

        match panel {
            Some(panel) => {
                sink.display(panel);
                true
            }
            None => !closed,
        }
    }

    /// Waits up to `timeout` for the next panel.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<Panel> {
        let pending = self.slot.lock();
        let (mut pending, _) = self
            .slot
            .ready
            .wait_timeout_while(pending, timeout, |p| p.panel.is_none() && !p.closed)
            .unwrap_or_else(PoisonError::into_inner);
        pending.panel.take()
    }
}

// Sending end used on the timer thread; drops panels after shutdown.
struct Outbox {
    slot: Arc<Slot>,
    stop: Arc<AtomicBool>,
}

impl ReportSink for Outbox {
    fn display(&mut self, panel: Panel) {
        if self.stop.load(Ordering::Acquire) {
            return;
        }

        if self.slot.lock().panel.replace(panel).is_some() {
            debug!("sink busy, older panel replaced");
        }
        self.slot.ready.notify_one();
    }
}

impl Drop for Outbox {
    fn drop(&mut self) {
        self.slot.lock().closed = true;
        self.slot.ready.notify_all();
    }
}

fn handoff(stop: Arc<AtomicBool>) -> (Outbox, Mailbox) {
    let slot = Arc::new(Slot::default());
    (
        Outbox {
            slot: slot.clone(),
            stop,
        },
        Mailbox { slot },
    )
}

// Whole periods elapsed past the deadline, counting the one just missed.
fn overrun_ticks(late: Duration, period: Duration) -> u32 {
    let missed = late.as_nanos() / period.as_nanos().max(1) + 1;
    u32::try_from(missed).unwrap_or(u32::MAX)
}

/// Handle to a running poll thread.
pub struct Poller<IFACE> {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<Option<IFACE>>>,
}

impl<IFACE> Poller<IFACE> {
    /// Stops ticking, waits for an in-flight tick and closes the session.
    ///
    /// Returns the released handle.
    pub fn stop(mut self) -> Option<IFACE> {
        self.halt()
    }

    fn halt(&mut self) -> Option<IFACE> {
        self.stop.store(true, Ordering::Release);
        let thread = self.thread.take()?;
        thread.thread().unpark();
        thread.join().ok().flatten()
    }
}

impl<IFACE> Drop for Poller<IFACE> {
    fn drop(&mut self) {
        self.halt();
    }
}

/// Starts ticking `monitor` on a dedicated thread.
///
/// The first tick runs immediately, later ones every [`POLL_PERIOD`]. A tick
/// that would start while the previous one is still running is skipped.
pub fn spawn<IFACE>(monitor: Monitor<IFACE>) -> Result<(Poller<IFACE>, Mailbox), IFACE::Error>
where
    IFACE: Cps120Interface + Send + 'static,
{
    spawn_with_period(monitor, POLL_PERIOD)
}

fn spawn_with_period<IFACE>(
    mut monitor: Monitor<IFACE>,
    period: Duration,
) -> Result<(Poller<IFACE>, Mailbox), IFACE::Error>
where
    IFACE: Cps120Interface + Send + 'static,
{
    if monitor.state() != PollState::Running {
        return Err(Error::NotReady);
    }

    let stop = Arc::new(AtomicBool::new(false));
    let (mut outbox, mailbox) = handoff(stop.clone());

    let thread = thread::spawn(move || {
        let mut next = Instant::now();
        while !outbox.stop.load(Ordering::Acquire) {
            monitor.tick(&mut outbox);

            next += period;
            let now = Instant::now();
            if now > next {
                let missed = overrun_ticks(now - next, period);
                warn!("tick overran, skipping {} ticks", missed);
                next += period * missed;
            }

            // Parking wakes early on stop.
            while !outbox.stop.load(Ordering::Acquire) {
                let now = Instant::now();
                if now >= next {
                    break;
                }
                thread::park_timeout(next - now);
            }
        }
        monitor.shutdown()
    });

    info!("poll thread started");
    Ok((
        Poller {
            stop,
            thread: Some(thread),
        },
        mailbox,
    ))
}
