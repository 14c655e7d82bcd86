use std::io;
use std::sync::PoisonError;

use clock::ClockType;

pub fn poisoned_lock<_T>(_: PoisonError<_T>) -> io::Error {
  io::Error::new(io::ErrorKind::Other, "Signal lock was poisoned. Can not continue.")
}

pub fn cannot_send_to_daemon() -> io::Error {
  io::Error::new(io::ErrorKind::BrokenPipe, "Timer daemon is no longer running")
}

pub fn daemon_spawn_failed(reason: io::Error) -> io::Error {
  io::Error::new(io::ErrorKind::Other, reason)
}

pub fn invalid_wait_clock(clock: ClockType) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidInput, format!("Waits cannot be timed against the {} clock", clock))
}

pub fn invalid_wait_slice() -> io::Error {
  io::Error::new(io::ErrorKind::InvalidInput, "Wait slice must be longer than zero")
}
