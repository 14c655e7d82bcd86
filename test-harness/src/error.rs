use std::io;

pub fn unknown_wait_clock(name: &str) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidInput, format!("Unknown wait clock '{}', expected monotonic or realtime", name))
}

pub fn expectation_failed(what: &str) -> io::Error {
  io::Error::new(io::ErrorKind::Other, format!("Expected {}", what))
}

pub fn jump_thread_panicked() -> io::Error {
  io::Error::new(io::ErrorKind::Other, "Clock jump thread panicked")
}
