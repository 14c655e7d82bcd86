use std::time::Duration;

use clock::ClockType;

use crate::constants::{time_ms, DAEMON_NAME, DEFAULT_WAIT_CLOCK};

#[derive(Debug, Clone)]
pub struct Conf {
  // Clock that timed waits measure their deadline against.
  // Only Monotonic and Realtime are accepted.
  pub wait_clock: ClockType,

  // Longest a timed wait sleeps before re-reading the wait clock.
  // Bounds how late a wait notices a jump in that clock.
  pub wait_slice: Duration,

  // Thread name of the timer daemon
  pub daemon_name: String
}

impl Default for Conf {
  fn default() -> Conf {
    Conf {
      wait_clock: DEFAULT_WAIT_CLOCK,
      wait_slice: time_ms::IOTA,
      daemon_name: DAEMON_NAME.to_string()
    }
  }
}
