use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::JoinHandle;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use log::trace;

use clock::{ClockType, Handle, Timestamp};

use crate::constants::time_ms;
use crate::error;
use crate::service::Deadlines;
use crate::timer;
use crate::warn;

/// Called on the daemon thread with the monotonic time the timer fired at
pub type OnExpire = Box<dyn FnOnce(Timestamp) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

enum ToDaemon {
  Add(TimerId, Timestamp, OnExpire),
  Cancel(TimerId),
  Wake,
  Shutdown
}

/// Fires callbacks when their deadlines pass.
/// Expiry is always judged against the monotonic clock, so wall-clock
/// jumps neither fire a timer early nor hold it back.
pub struct Timers {
  tx: Sender<ToDaemon>,
  next_id: AtomicU64,
  deadlines: Deadlines,
  daemon: Option<JoinHandle<()>>
}

impl Timers {
  pub(crate) fn spawn(deadlines: Deadlines) -> io::Result<Timers> {
    let (tx, rx) = channel::unbounded();
    let clock = deadlines.clock().clone();
    let daemon = std::thread::Builder::new()
      .name(deadlines.conf().daemon_name.clone())
      .spawn(move || run(rx, clock))
      .map_err(error::daemon_spawn_failed)?;

    Ok(Timers {
      tx,
      next_id: AtomicU64::new(0),
      deadlines,
      daemon: Some(daemon)
    })
  }

  /// Registers `on_expire` to run once `deadline` passes.
  /// Deadlines from other clocks are converted to monotonic time now.
  pub fn add<F: 'static + FnOnce(Timestamp) + Send>(&self, deadline: Timestamp, on_expire: F) -> io::Result<TimerId> {
    let id = TimerId(self.next_id.fetch_add(1, Ordering::SeqCst));
    let when = self.deadlines.convert(deadline, ClockType::Monotonic);
    self.send(ToDaemon::Add(id, when, Box::new(on_expire)))?;
    Ok(id)
  }

  // Cancelling a timer that already fired does nothing
  pub fn cancel(&self, id: TimerId) -> io::Result<()> {
    self.send(ToDaemon::Cancel(id))
  }

  /// Makes the daemon re-read the clock, e.g. after ticking a mock clock
  pub fn wake(&self) -> io::Result<()> {
    self.send(ToDaemon::Wake)
  }

  fn send(&self, msg: ToDaemon) -> io::Result<()> {
    self.tx.send(msg).map_err(|_| error::cannot_send_to_daemon())
  }
}

impl Drop for Timers {
  fn drop(&mut self) {
    if self.tx.send(ToDaemon::Shutdown).is_err() {
      warn::shutdown_send_failed();
    }
    if let Some(daemon) = self.daemon.take() {
      if daemon.join().is_err() {
        warn::daemon_panicked();
      }
    }
  }
}

struct State {
  list: timer::List<TimerId>,
  pending: HashMap<TimerId, (Timestamp, OnExpire)>
}

impl State {
  // Returns false once the daemon should stop
  fn handle(&mut self, msg: ToDaemon) -> bool {
    match msg {
      ToDaemon::Add(id, when, on_expire) => {
        trace!("Timer {:?} due at {}", id, when);
        self.list.add(id, when);
        self.pending.insert(id, (when, on_expire));
      },
      ToDaemon::Cancel(id) => {
        if let Some((when, _)) = self.pending.remove(&id) {
          trace!("Timer {:?} cancelled", id);
          self.list.remove(id, when);
        }
      },
      ToDaemon::Wake => (),
      ToDaemon::Shutdown => return false
    }
    true
  }

  fn fire(&mut self, now: Timestamp) {
    let expired: Vec<TimerId> = self.list.expire(now).map(|(_, id)| id).collect();
    for id in expired {
      if let Some((when, on_expire)) = self.pending.remove(&id) {
        trace!("Timer {:?} due at {} fired at {}", id, when, now);
        on_expire(now);
      }
    }
  }
}

fn run(rx: Receiver<ToDaemon>, clock: Handle) {
  let mut state = State {
    list: timer::List::new(),
    pending: HashMap::new()
  };

  loop {
    let now = clock.now(ClockType::Monotonic);
    state.fire(now);

    let timeout = state.list.when_next()
      .map(|next| (next - now).to_std().unwrap_or(time_ms::ZERO))
      .unwrap_or(time_ms::HEARTBEAT)
      .min(time_ms::HEARTBEAT);

    let keep_running = match rx.recv_timeout(timeout) {
      Ok(msg) => state.handle(msg) && rx.try_iter().all(|msg| state.handle(msg)),
      Err(RecvTimeoutError::Timeout) => true,
      Err(RecvTimeoutError::Disconnected) => false
    };

    if !keep_running {
      trace!("Timer daemon stopping with {} timers pending", state.list.live());
      return;
    }
  }
}
