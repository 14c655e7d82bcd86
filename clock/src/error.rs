use std::io;

pub fn invalid_clock_type(raw: u32) -> io::Error {
  io::Error::new(io::ErrorKind::InvalidInput, format!("Unrecognized clock type: {}", raw))
}
