use std::convert::TryFrom;
use std::fmt;
use std::io;
use std::sync::Arc;

mod error;
mod fatal;
mod handle;
mod timespec;

pub mod sys;
pub mod mock;

pub use handle::{Handle, Restore};
pub use timespec::{Timestamp, Timespan, NS_PER_SEC};

/// The clocks a timestamp can be read from.
/// Monotonic never decreases and ignores wall-clock changes.
/// Realtime is the wall clock and may jump either way.
/// Precise is a high resolution reading of the wall clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClockType {
  Monotonic = 0,
  Realtime = 1,
  Precise = 2
}

impl ClockType {
  pub const ALL: [ClockType; 3] = [ClockType::Monotonic, ClockType::Realtime, ClockType::Precise];

  // Unrecognized values are a programming error and end the process
  pub fn from_raw(raw: u32) -> ClockType {
    ClockType::try_from(raw).unwrap_or_else(|e| fatal::abort(format_args!("{}", e)))
  }
}

impl TryFrom<u32> for ClockType {
  type Error = io::Error;

  fn try_from(raw: u32) -> io::Result<ClockType> {
    match raw {
      0 => Ok(ClockType::Monotonic),
      1 => Ok(ClockType::Realtime),
      2 => Ok(ClockType::Precise),
      _ => Err(error::invalid_clock_type(raw))
    }
  }
}

impl fmt::Display for ClockType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ClockType::Monotonic => "monotonic",
      ClockType::Realtime => "realtime",
      ClockType::Precise => "precise"
    };
    f.write_str(name)
  }
}

/// Source of the current time, per clock type.
/// Implementations must keep ClockType::Monotonic non-decreasing.
pub trait Clock: Send + Sync {
  fn now(&self, clock: ClockType) -> Timestamp;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
  fn now(&self, clock: ClockType) -> Timestamp {
    (**self).now(clock)
  }
}
