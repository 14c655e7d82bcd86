use std::fmt;

use log::error;

/// Ends the process on a broken precondition.
/// Never unwinds, so neither a thread boundary nor catch_unwind can stop it.
pub fn abort(reason: fmt::Arguments) -> ! {
  error!("{}", reason);
  eprintln!("Fatal: {}", reason);
  std::process::abort()
}
