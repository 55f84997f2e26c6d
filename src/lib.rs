#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(all(test, not(feature = "std")))]
#[macro_use]
extern crate std;

mod error;
#[macro_use]
mod log;

pub mod bus;
pub mod codec;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod registers;
pub mod report;
#[cfg(feature = "std")]
pub mod runner;
pub mod scheduler;

pub use crate::codec::Reading;
pub use crate::device::Cps120;
pub use crate::error::{Error, Result};
pub use crate::report::{Panel, ReportSink};
pub use crate::scheduler::{Monitor, PollState};
