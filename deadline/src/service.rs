use std::io;
use std::sync::Arc;

use log::{debug, trace};

use clock::{ClockType, Handle, Timestamp, Timespan};

use crate::daemon::Timers;
use crate::error;
use crate::sync::{SignalGuard, WaitOutcome};

mod builder;
mod conf;

pub use builder::Builder;
pub use conf::Conf;

/// Turns timeouts into deadlines and waits on them.
/// Cheap to clone; clones share the clock and configuration.
#[derive(Clone)]
pub struct Deadlines {
  clock: Handle,
  conf: Arc<Conf>
}

impl Deadlines {
  pub(crate) fn initialize(conf: Conf, clock: Handle) -> io::Result<Deadlines> {
    match conf.wait_clock {
      ClockType::Monotonic | ClockType::Realtime => (),
      other => return Err(error::invalid_wait_clock(other))
    }
    if conf.wait_slice.as_nanos() == 0 {
      return Err(error::invalid_wait_slice());
    }

    debug!("Timed waits use the {} clock", conf.wait_clock);
    Ok(Deadlines { clock, conf: Arc::new(conf) })
  }

  pub fn clock(&self) -> &Handle {
    &self.clock
  }

  pub fn conf(&self) -> &Conf {
    &self.conf
  }

  pub fn now(&self, clock: ClockType) -> Timestamp {
    self.clock.now(clock)
  }

  /// now(clock) + timeout. A negative timeout gives a deadline that has already passed.
  pub fn deadline_from_timeout(&self, timeout: Timespan, clock: ClockType) -> Timestamp {
    self.clock.now(clock) + timeout
  }

  pub fn millis_to_deadline(&self, ms: i64) -> Timestamp {
    self.deadline_from_timeout(Timespan::from_millis(ms), ClockType::Monotonic)
  }

  /// Re-expresses a deadline in another clock by keeping its distance from now.
  /// The two clocks are read one after the other, so the result can drift by
  /// however long that takes.
  pub fn convert(&self, deadline: Timestamp, to: ClockType) -> Timestamp {
    if deadline.clock == to || deadline.is_infinite() {
      return deadline.with_clock(to);
    }
    let remaining = deadline - self.clock.now(deadline.clock);
    self.clock.now(to) + remaining
  }

  pub fn is_expired(&self, deadline: Timestamp) -> bool {
    self.clock.now(deadline.clock) >= deadline
  }

  /// Blocks until `condition` holds for the guarded value or the deadline passes.
  ///
  /// The deadline is converted into the configured wait clock once, up front, the
  /// way an OS condvar holds an absolute deadline. While waiting the wait clock is
  /// re-read at least every `wait_slice`, so a jump in that clock moves the expiry.
  /// A jump in any other clock does not.
  pub fn wait_until<'a, T, F>(
    &self,
    guard: SignalGuard<'a, T>,
    deadline: Timestamp,
    mut condition: F
  ) -> io::Result<(SignalGuard<'a, T>, WaitOutcome)>
  where F: FnMut(&T) -> bool {
    let wait_clock = self.conf.wait_clock;
    let target = self.convert(deadline, wait_clock);
    let mut guard = guard;

    loop {
      if condition(&*guard) {
        trace!("Wait signaled before {}", target);
        return Ok((guard, WaitOutcome::Signaled));
      }

      let now = self.clock.now(wait_clock);
      if now >= target {
        trace!("Wait expired at {}, deadline was {}", now, target);
        return Ok((guard, WaitOutcome::Expired));
      }

      let sleep = (target - now).to_std()
        .map(|remaining| remaining.min(self.conf.wait_slice))
        .unwrap_or(self.conf.wait_slice);
      guard = guard.wait_timeout(sleep)?;
    }
  }

  /// Starts a timer daemon that shares this clock
  pub fn timers(&self) -> io::Result<Timers> {
    Timers::spawn(self.clone())
  }
}
