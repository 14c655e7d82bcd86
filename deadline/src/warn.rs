use log::warn;

pub fn shutdown_send_failed() {
  warn!("Timer daemon stopped before shutdown was requested. Pending timers were dropped.")
}

pub fn daemon_panicked() {
  warn!("Timer daemon panicked, most likely inside an expiry callback. Pending timers were dropped.")
}
