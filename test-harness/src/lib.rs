use std::io;

use clock::ClockType;

mod error;

pub mod constants;
pub mod echo;
pub mod scenario;

/// Parses the name of a clock that waits may be timed against
pub fn parse_wait_clock(name: &str) -> io::Result<ClockType> {
  match name {
    "monotonic" => Ok(ClockType::Monotonic),
    "realtime" => Ok(ClockType::Realtime),
    other => Err(error::unknown_wait_clock(other))
  }
}
