use std::sync::{Arc, Mutex};

use log::debug;

use super::Clock as ClockT;
use crate::{ClockType, Timestamp, Timespan};

/// A clock that only moves when ticked.
/// Monotonic starts at zero and realtime at the given time since the epoch;
/// both advance together.
#[derive(Clone)]
pub struct Clock {
  elapsed: Arc<Mutex<Timespan>>,
  realtime_origin: Timespan
}

impl Clock {
  pub fn new(realtime_origin: Timespan) -> Clock {
    Clock {
      elapsed: Arc::new(Mutex::new(Timespan::ZERO)),
      realtime_origin
    }
  }

  pub fn tick_ms(&self, amount_ms: u64) {
    self.tick(Timespan::from_millis(amount_ms as i64));
  }

  pub fn tick(&self, amount: Timespan) {
    assert!(!amount.is_negative(), "A mock clock cannot tick backwards: {}", amount);
    let mut elapsed = self.elapsed.lock().expect("Could not acquire unpoisoned test clock mutex");
    *elapsed = *elapsed + amount;
  }
}

impl ClockT for Clock {
  fn now(&self, clock: ClockType) -> Timestamp {
    let elapsed = *self.elapsed.lock().expect("Could not acquire unpoisoned test clock mutex");
    let origin = match clock {
      ClockType::Monotonic => Timestamp::zero(clock),
      ClockType::Realtime | ClockType::Precise => Timestamp::zero(clock) + self.realtime_origin
    };
    origin + elapsed
  }
}

/// Shifts the realtime clock of another source, simulating a wall-clock step.
/// Monotonic and precise readings pass through untouched.
pub struct Offset {
  inner: Arc<dyn ClockT>,
  offset: Mutex<Timespan>
}

impl Offset {
  pub fn wrap(inner: Arc<dyn ClockT>, offset: Timespan) -> Offset {
    Offset {
      inner,
      offset: Mutex::new(offset)
    }
  }

  /// Replaces the offset; offsets do not accumulate.
  pub fn set(&self, offset: Timespan) {
    let mut current = self.offset.lock().expect("Could not acquire unpoisoned clock offset mutex");
    *current = offset;
    debug!("Realtime offset now {}", offset);
  }

  pub fn set_millis(&self, ms: i64) {
    self.set(Timespan::from_millis(ms));
  }

  pub fn clear(&self) {
    self.set(Timespan::ZERO);
  }

  pub fn get(&self) -> Timespan {
    *self.offset.lock().expect("Could not acquire unpoisoned clock offset mutex")
  }
}

impl ClockT for Offset {
  fn now(&self, clock: ClockType) -> Timestamp {
    let now = self.inner.now(clock);
    if clock != ClockType::Realtime {
      return now;
    }
    now + self.get()
  }
}
