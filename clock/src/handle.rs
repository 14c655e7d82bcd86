use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::{Clock, ClockType, Timestamp, Timespan};
use crate::mock::Offset;
use crate::sys;

struct Sources {
  // What reset() restores
  base: Arc<dyn Clock>,
  // What now() reads from; shadows base after an install
  installed: Arc<dyn Clock>
}

/// A shared, swappable clock.
/// Every clone reads from the same installed source, so a test can hand
/// clones to the code under test and then shift time underneath it.
#[derive(Clone)]
pub struct Handle {
  sources: Arc<Mutex<Sources>>
}

/// Restores the handle's original source when dropped, including on unwind.
#[must_use = "the original clock is restored as soon as the guard is dropped"]
pub struct Restore {
  handle: Handle
}

impl Drop for Restore {
  fn drop(&mut self) {
    self.handle.reset();
  }
}

impl Handle {
  pub fn new<C: 'static + Clock>(base: C) -> Handle {
    let base: Arc<dyn Clock> = Arc::new(base);
    Handle {
      sources: Arc::new(Mutex::new(Sources {
        installed: Arc::clone(&base),
        base
      }))
    }
  }

  /// A handle over the OS clocks
  pub fn system() -> Handle {
    Handle::new(sys::Clock::new())
  }

  fn lock(&self) -> MutexGuard<Sources> {
    self.sources.lock().expect("Could not acquire unpoisoned clock source mutex")
  }

  pub fn now(&self, clock: ClockType) -> Timestamp {
    let source = Arc::clone(&self.lock().installed);
    source.now(clock)
  }

  /// Reads a clock named by its raw value. Aborts if the value names no clock.
  pub fn now_raw(&self, raw: u32) -> Timestamp {
    self.now(ClockType::from_raw(raw))
  }

  /// Installs a new source, returning the one it shadows.
  pub fn install<C: 'static + Clock>(&self, source: C) -> Arc<dyn Clock> {
    self.install_shared(Arc::new(source))
  }

  pub fn install_shared(&self, source: Arc<dyn Clock>) -> Arc<dyn Clock> {
    debug!("Installing new clock source");
    std::mem::replace(&mut self.lock().installed, source)
  }

  /// Wraps the installed source so that only ClockType::Realtime is shifted by `delta`.
  /// The returned offset can be changed later without reinstalling.
  pub fn offset_realtime(&self, delta: Timespan) -> Arc<Offset> {
    let mut sources = self.lock();
    let offset = Arc::new(Offset::wrap(Arc::clone(&sources.installed), delta));
    sources.installed = Arc::clone(&offset) as Arc<dyn Clock>;
    debug!("Installed realtime offset of {}", delta);
    offset
  }

  /// Drops every installed source and goes back to the original one
  pub fn reset(&self) {
    let mut sources = self.lock();
    sources.installed = Arc::clone(&sources.base);
    debug!("Clock source reset");
  }

  pub fn scoped(&self) -> Restore {
    Restore { handle: self.clone() }
  }
}

impl Default for Handle {
  fn default() -> Handle {
    Handle::system()
  }
}

impl Clock for Handle {
  fn now(&self, clock: ClockType) -> Timestamp {
    Handle::now(self, clock)
  }
}
