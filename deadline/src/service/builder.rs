use std::io;
use std::time::Duration;

use clock::{ClockType, Handle};

use super::{Conf, Deadlines};

pub struct Builder {
  conf: Conf,
  clock: Option<Handle>
}

impl Builder {
  pub fn new() -> Builder {
    Builder { conf: Conf::default(), clock: None }
  }

  /// Shares the given clock instead of reading the OS clocks directly
  pub fn clock(mut self, clock: Handle) -> Builder {
    self.clock = Some(clock);
    self
  }

  pub fn wait_clock(mut self, wait_clock: ClockType) -> Builder {
    self.conf.wait_clock = wait_clock;
    self
  }

  pub fn wait_slice(mut self, wait_slice: Duration) -> Builder {
    self.conf.wait_slice = wait_slice;
    self
  }

  pub fn daemon_name<S: Into<String>>(mut self, daemon_name: S) -> Builder {
    self.conf.daemon_name = daemon_name.into();
    self
  }

  pub fn build(self) -> io::Result<Deadlines> {
    let clock = self.clock.unwrap_or_else(Handle::system);
    Deadlines::initialize(self.conf, clock)
  }
}

impl Default for Builder {
  fn default() -> Builder {
    Builder::new()
  }
}
