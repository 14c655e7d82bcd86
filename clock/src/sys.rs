use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};

use super::Clock as ClockT;
use crate::{ClockType, Timestamp, Timespan};

// Monotonic timestamps count from the first time any system clock is read
static MONOTONIC_ORIGIN: OnceLock<Instant> = OnceLock::new();

/// The operating system's clocks
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock();

impl Clock {
  pub fn new() -> Clock {
    MONOTONIC_ORIGIN.get_or_init(Instant::now);
    Clock()
  }
}

fn since_epoch(clock: ClockType) -> Timestamp {
  let zero = Timestamp::zero(clock);
  match SystemTime::now().duration_since(UNIX_EPOCH) {
    Ok(after) => zero + Timespan::from_std(after),
    Err(before) => zero - Timespan::from_std(before.duration())
  }
}

impl ClockT for Clock {
  fn now(&self, clock: ClockType) -> Timestamp {
    match clock {
      ClockType::Monotonic => {
        let origin = MONOTONIC_ORIGIN.get_or_init(Instant::now);
        Timestamp::zero(clock) + Timespan::from_std(origin.elapsed())
      },
      ClockType::Realtime | ClockType::Precise => since_epoch(clock)
    }
  }
}
