use clock::ClockType;

// Condition variable waits measure their timeout against the monotonic
// clock on Linux and against the wall clock everywhere else.
#[cfg(target_os = "linux")]
pub const DEFAULT_WAIT_CLOCK: ClockType = ClockType::Monotonic;
#[cfg(not(target_os = "linux"))]
pub const DEFAULT_WAIT_CLOCK: ClockType = ClockType::Realtime;

pub const DAEMON_NAME: &str = "deadline timers";

pub mod time_ms {
  use std::time::Duration;

  pub const ZERO: Duration = Duration::from_millis(0);
  pub const IOTA: Duration = Duration::from_millis(10);
  pub const HEARTBEAT: Duration = Duration::from_millis(1_000);
}
