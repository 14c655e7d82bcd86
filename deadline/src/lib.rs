mod constants;
mod daemon;
mod error;
mod service;
mod sync;
mod warn;

pub mod timer;

pub use constants::{time_ms, DEFAULT_WAIT_CLOCK};
pub use daemon::{Timers, TimerId};
pub use service::{Builder, Conf, Deadlines};
pub use sync::{Event, Signal, SignalGuard, WaitOutcome};
