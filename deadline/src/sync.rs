use std::io;
use std::ops::{Deref, DerefMut};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use clock::Timestamp;

use crate::error;
use crate::service::Deadlines;

/// Mutex with its associated condvar.
/// The condvar can only be waited on through the guard, i.e. while the lock is held,
/// so a change to the guarded value can never slip between the check and the wait.
#[derive(Debug, Default)]
pub struct Signal<T> {
  mx: Mutex<T>,
  cv: Condvar
}

impl<T> Signal<T> {
  pub fn new(t: T) -> Signal<T> {
    Signal {
      mx: Mutex::new(t),
      cv: Condvar::new()
    }
  }

  pub fn lock(&self) -> io::Result<SignalGuard<T>> {
    self.mx.lock()
      .map(|guard| SignalGuard { guard, cv: &self.cv })
      .map_err(error::poisoned_lock)
  }
}

#[derive(Debug)]
pub struct SignalGuard<'a, T: 'a> {
  guard: MutexGuard<'a, T>,
  cv: &'a Condvar
}

impl<'a, T> SignalGuard<'a, T> {
  pub fn wait(self) -> io::Result<SignalGuard<'a, T>> {
    let cv = self.cv;
    cv.wait(self.guard)
      .map(|guard| SignalGuard { guard, cv })
      .map_err(error::poisoned_lock)
  }

  // Spurious wakeups are passed through; callers re-check their condition
  pub fn wait_timeout(self, timeout: Duration) -> io::Result<SignalGuard<'a, T>> {
    let cv = self.cv;
    cv.wait_timeout(self.guard, timeout)
      .map(|(guard, _)| SignalGuard { guard, cv })
      .map_err(error::poisoned_lock)
  }

  pub fn notify_all(&self) {
    self.cv.notify_all()
  }
}

impl<T> Deref for SignalGuard<'_, T> {
  type Target = T;

  fn deref(&self) -> &T {
    self.guard.deref()
  }
}

impl<T> DerefMut for SignalGuard<'_, T> {
  fn deref_mut(&mut self) -> &mut T {
    self.guard.deref_mut()
  }
}

/// How a timed wait ended. Both outcomes are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitOutcome {
  Signaled,
  Expired
}

impl WaitOutcome {
  pub fn is_signaled(self) -> bool {
    self == WaitOutcome::Signaled
  }
}

/// A one-shot flag that threads can block on until it is set or a deadline passes.
#[derive(Debug, Default)]
pub struct Event {
  set: Signal<bool>
}

impl Event {
  pub fn new() -> Event {
    Event { set: Signal::new(false) }
  }

  pub fn signal(&self) -> io::Result<()> {
    let mut set = self.set.lock()?;
    *set = true;
    set.notify_all();
    Ok(())
  }

  pub fn is_signaled(&self) -> io::Result<bool> {
    self.set.lock().map(|set| *set)
  }

  /// True if the event was signaled before the deadline passed.
  pub fn wait_until(&self, deadlines: &Deadlines, deadline: Timestamp) -> io::Result<bool> {
    let set = self.set.lock()?;
    let (_, outcome) = deadlines.wait_until(set, deadline, |set| *set)?;
    Ok(outcome.is_signaled())
  }
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;
  use std::time::Duration;

  use super::Signal;

  #[test]
  fn wakes_waiter() {
    let signal = Arc::new(Signal::new(0usize));
    let producer = Arc::clone(&signal);
    let handle = std::thread::spawn(move || {
      std::thread::sleep(Duration::from_millis(5));
      let mut count = producer.lock().expect("Could not lock");
      *count += 1;
      count.notify_all();
    });

    let mut count = signal.lock().expect("Could not lock");
    while *count == 0 {
      count = count.wait().expect("Could not wait");
    }
    assert_eq!(*count, 1);
    drop(count);
    handle.join().expect("Producer panicked");
  }

  #[test]
  fn timeout_returns_the_guard() {
    let signal = Signal::new(7u8);
    let guard = signal.lock().expect("Could not lock");
    let guard = guard.wait_timeout(Duration::from_millis(1)).expect("Could not wait");
    assert_eq!(*guard, 7);
  }
}
