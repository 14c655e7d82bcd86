use std::cmp::Ordering;
use std::convert::TryFrom;
use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

use crate::fatal;
use crate::ClockType;

pub const NS_PER_SEC: i32 = 1_000_000_000;
const NS_PER_MS: i64 = 1_000_000;
const MS_PER_SEC: i64 = 1_000;

/// A signed span of time, not tied to any clock.
/// Nanoseconds are always in [0, NS_PER_SEC); a negative span
/// carries negative seconds and a positive nanosecond remainder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timespan {
  pub sec: i64,
  pub nsec: i32
}

/// An instant read from a specific clock.
/// Same nanosecond invariant as Timespan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Timestamp {
  pub sec: i64,
  pub nsec: i32,
  pub clock: ClockType
}

// Folds a nanosecond count that is at most one second out of range back into [0, NS_PER_SEC)
fn normalize(sec: i64, nsec: i64) -> (i64, i32) {
  let ns = NS_PER_SEC as i64;
  let (sec, nsec) = if nsec >= ns {
    (sec.saturating_add(1), nsec - ns)
  } else if nsec < 0 {
    (sec.saturating_sub(1), nsec + ns)
  } else {
    (sec, nsec)
  };
  if nsec < 0 || nsec >= ns {
    fatal::abort(format_args!("Nanoseconds still out of range after normalizing: {}", nsec));
  }
  (sec, nsec as i32)
}

// Any nanosecond count, folded in as many whole seconds as it takes
fn normalize_euclid(sec: i64, nsec: i64) -> (i64, i32) {
  let ns = NS_PER_SEC as i64;
  (sec.saturating_add(nsec.div_euclid(ns)), nsec.rem_euclid(ns) as i32)
}

fn check_operand(what: &str, nsec: i32) {
  if nsec < 0 || nsec >= NS_PER_SEC {
    fatal::abort(format_args!("{} operand has nanoseconds outside [0, 1e9): {}", what, nsec));
  }
}

fn check_same_clock(op: &str, a: ClockType, b: ClockType) {
  if a != b {
    fatal::abort(format_args!("Cannot {} timestamps of different clocks: {} and {}", op, a, b));
  }
}

impl Timespan {
  pub const ZERO: Timespan = Timespan { sec: 0, nsec: 0 };

  /// Builds a span from a second count and a nanosecond part in any range.
  pub fn new(sec: i64, nsec: i32) -> Timespan {
    let (sec, nsec) = normalize_euclid(sec, nsec as i64);
    Timespan { sec, nsec }
  }

  pub fn from_secs(sec: i64) -> Timespan {
    Timespan { sec, nsec: 0 }
  }

  // -1500ms becomes (-2s, 500_000_000ns)
  pub fn from_millis(ms: i64) -> Timespan {
    let sec = ms / MS_PER_SEC;
    let nsec = (ms % MS_PER_SEC) * NS_PER_MS;
    Timespan::new(sec, nsec as i32)
  }

  pub fn from_std(duration: Duration) -> Timespan {
    Timespan {
      sec: i64::try_from(duration.as_secs()).unwrap_or(i64::MAX),
      nsec: duration.subsec_nanos() as i32
    }
  }

  /// None when the span is negative.
  pub fn to_std(self) -> Option<Duration> {
    if self.is_negative() {
      None
    } else {
      Some(Duration::new(self.sec as u64, self.nsec as u32))
    }
  }

  pub fn as_millis(self) -> i64 {
    self.sec
      .saturating_mul(MS_PER_SEC)
      .saturating_add(self.nsec as i64 / NS_PER_MS)
  }

  pub fn is_negative(self) -> bool {
    self.sec < 0
  }
}

impl Add<Timespan> for Timespan {
  type Output = Timespan;

  fn add(self, other: Timespan) -> Timespan {
    check_operand("Timespan", self.nsec);
    check_operand("Timespan", other.nsec);
    let (carry, nsec) = normalize(0, self.nsec as i64 + other.nsec as i64);
    Timespan {
      sec: self.sec.saturating_add(other.sec).saturating_add(carry),
      nsec
    }
  }
}

impl fmt::Display for Timespan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}ms", self.as_millis())
  }
}

impl Timestamp {
  pub fn new(sec: i64, nsec: i32, clock: ClockType) -> Timestamp {
    let (sec, nsec) = normalize_euclid(sec, nsec as i64);
    Timestamp { sec, nsec, clock }
  }

  pub fn zero(clock: ClockType) -> Timestamp {
    Timestamp { sec: 0, nsec: 0, clock }
  }

  /// A deadline that never passes.
  pub fn inf_future(clock: ClockType) -> Timestamp {
    Timestamp { sec: i64::MAX, nsec: 0, clock }
  }

  /// A deadline that has always passed.
  pub fn inf_past(clock: ClockType) -> Timestamp {
    Timestamp { sec: i64::MIN, nsec: 0, clock }
  }

  pub fn is_inf_future(&self) -> bool {
    self.sec == i64::MAX
  }

  pub fn is_inf_past(&self) -> bool {
    self.sec == i64::MIN
  }

  pub fn is_infinite(&self) -> bool {
    self.is_inf_future() || self.is_inf_past()
  }

  /// Same instant, relabelled. Used after converting between clocks.
  pub fn with_clock(self, clock: ClockType) -> Timestamp {
    Timestamp { clock, ..self }
  }

  pub fn since_zero(self) -> Timespan {
    Timespan { sec: self.sec, nsec: self.nsec }
  }

  fn saturated(self, sec: Option<i64>, nsec: i32, forward: bool) -> Timestamp {
    match sec {
      Some(sec) if sec != i64::MAX && sec != i64::MIN => Timestamp { sec, nsec, clock: self.clock },
      _ if forward => Timestamp::inf_future(self.clock),
      _ => Timestamp::inf_past(self.clock)
    }
  }
}

impl Add<Timespan> for Timestamp {
  type Output = Timestamp;

  fn add(self, span: Timespan) -> Timestamp {
    check_operand("Timestamp", self.nsec);
    check_operand("Timespan", span.nsec);
    if self.is_infinite() {
      return self;
    }

    let (carry, nsec) = normalize(0, self.nsec as i64 + span.nsec as i64);
    let sec = self.sec
      .checked_add(span.sec)
      .and_then(|sec| sec.checked_add(carry));
    self.saturated(sec, nsec, !span.is_negative())
  }
}

impl Sub<Timespan> for Timestamp {
  type Output = Timestamp;

  fn sub(self, span: Timespan) -> Timestamp {
    check_operand("Timestamp", self.nsec);
    check_operand("Timespan", span.nsec);
    if self.is_infinite() {
      return self;
    }

    let (carry, nsec) = normalize(0, self.nsec as i64 - span.nsec as i64);
    let sec = self.sec
      .checked_sub(span.sec)
      .and_then(|sec| sec.checked_add(carry));
    self.saturated(sec, nsec, span.is_negative())
  }
}

impl Sub<Timestamp> for Timestamp {
  type Output = Timespan;

  fn sub(self, other: Timestamp) -> Timespan {
    check_same_clock("subtract", self.clock, other.clock);
    check_operand("Timestamp", self.nsec);
    check_operand("Timestamp", other.nsec);
    if self.is_inf_future() || other.is_inf_past() {
      return Timespan::from_secs(i64::MAX);
    }
    if self.is_inf_past() || other.is_inf_future() {
      return Timespan::from_secs(i64::MIN);
    }

    let (carry, nsec) = normalize(0, self.nsec as i64 - other.nsec as i64);
    let sec = self.sec.saturating_sub(other.sec).saturating_add(carry);
    Timespan { sec, nsec }
  }
}

impl Ord for Timestamp {
  fn cmp(&self, other: &Timestamp) -> Ordering {
    check_same_clock("compare", self.clock, other.clock);
    self.sec.cmp(&other.sec).then(self.nsec.cmp(&other.nsec))
  }
}

impl PartialOrd for Timestamp {
  fn partial_cmp(&self, other: &Timestamp) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for Timestamp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_inf_future() {
      write!(f, "+inf ({})", self.clock)
    } else if self.is_inf_past() {
      write!(f, "-inf ({})", self.clock)
    } else {
      write!(f, "{}.{:09} ({})", self.sec, self.nsec, self.clock)
    }
  }
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;
  use std::time::Duration;

  use crate::fatal::death;
  use crate::ClockType;
  use super::{Timestamp, Timespan, NS_PER_SEC};

  #[test]
  fn negative_millis() {
    let span = Timespan::from_millis(-1500);
    assert_eq!(span, Timespan { sec: -2, nsec: 500_000_000 });
    assert_eq!(span.as_millis(), -1500);
  }

  #[test]
  fn offset_millis() {
    assert_eq!(Timespan::from_millis(20123), Timespan { sec: 20, nsec: 123_000_000 });
    assert_eq!(Timespan::from_millis(-5678), Timespan { sec: -6, nsec: 322_000_000 });
  }

  #[test]
  fn carries_into_seconds() {
    let t = Timestamp::new(10, 900_000_000, ClockType::Monotonic);
    let later = t + Timespan::from_millis(200);
    assert_eq!((later.sec, later.nsec), (11, 100_000_000));

    let earlier = t - Timespan::from_millis(1950);
    assert_eq!((earlier.sec, earlier.nsec), (8, 950_000_000));
  }

  #[test]
  fn borrows_from_seconds() {
    let t = Timestamp::new(10, 100_000_000, ClockType::Realtime);
    let shifted = t + Timespan::from_millis(-5678);
    assert_eq!((shifted.sec, shifted.nsec), (4, 422_000_000));
    assert_eq!(shifted.clock, ClockType::Realtime);
  }

  #[test]
  fn unnormalized_parts() {
    assert_eq!(Timespan::new(-5, -678_000_000), Timespan { sec: -6, nsec: 322_000_000 });
    assert_eq!(Timespan::new(1, 1_500_000_000), Timespan { sec: 2, nsec: 500_000_000 });
  }

  #[test]
  fn difference() {
    let a = Timestamp::new(3, 0, ClockType::Monotonic);
    let b = Timestamp::new(1, 500_000_000, ClockType::Monotonic);
    assert_eq!(a - b, Timespan::from_millis(1500));
    assert_eq!(b - a, Timespan::from_millis(-1500));
  }

  #[test]
  fn wide_nanoseconds() {
    assert_eq!(Timespan::new(0, i32::MAX), Timespan { sec: 2, nsec: 147_483_647 });
    assert_eq!(Timespan::new(0, i32::MIN), Timespan { sec: -3, nsec: 852_516_352 });
    let t = Timestamp::new(10, 2_000_000_000, ClockType::Precise);
    assert_eq!((t.sec, t.nsec), (12, 0));
  }

  #[test]
  fn add_negative_nanoseconds() {
    death::expect_abort("timespec::tests::add_negative_nanoseconds", || {
      let now = Timestamp::new(100, 0, ClockType::Monotonic);
      let _ = now + Timespan { sec: 1, nsec: -1000 };
    });
  }

  #[test]
  fn sub_negative_nanoseconds() {
    death::expect_abort("timespec::tests::sub_negative_nanoseconds", || {
      let now = Timestamp::new(100, 0, ClockType::Monotonic);
      let _ = now - Timespan { sec: 1, nsec: -1000 };
    });
  }

  #[test]
  fn negative_nanoseconds_abort_from_a_spawned_thread() {
    death::expect_abort("timespec::tests::negative_nanoseconds_abort_from_a_spawned_thread", || {
      let _ = std::thread::spawn(|| {
        Timestamp::zero(ClockType::Realtime) + Timespan { sec: 0, nsec: -1 }
      }).join();
    });
  }

  #[test]
  fn compare_across_clocks() {
    death::expect_abort("timespec::tests::compare_across_clocks", || {
      let a = Timestamp::zero(ClockType::Monotonic);
      let b = Timestamp::zero(ClockType::Realtime);
      let _ = a < b;
    });
  }

  #[test]
  fn infinities_absorb_arithmetic() {
    let future = Timestamp::inf_future(ClockType::Monotonic);
    let past = Timestamp::inf_past(ClockType::Monotonic);
    assert!((future - Timespan::from_secs(1_000)).is_inf_future());
    assert!((past + Timespan::from_secs(1_000)).is_inf_past());
    assert!(past < Timestamp::zero(ClockType::Monotonic));
    assert!(future > Timestamp::zero(ClockType::Monotonic));
  }

  #[test]
  fn overflow_saturates() {
    let t = Timestamp::new(i64::MAX - 1, 0, ClockType::Realtime);
    assert!((t + Timespan::from_secs(10)).is_inf_future());
    let t = Timestamp::new(i64::MIN + 1, 0, ClockType::Realtime);
    assert!((t - Timespan::from_secs(10)).is_inf_past());
  }

  #[test]
  fn std_durations() {
    assert_eq!(Timespan::from_millis(-1).to_std(), None);
    assert_eq!(Timespan::from_millis(1500).to_std(), Some(Duration::from_millis(1500)));
    assert_eq!(Timespan::from_std(Duration::from_micros(2_000_001)), Timespan { sec: 2, nsec: 1_000 });
  }

  proptest! {
    #[test]
    fn add_then_sub_round_trips(
      sec in -1_000_000_000i64..1_000_000_000,
      nsec in 0i32..NS_PER_SEC,
      ms in -1_000_000_000i64..1_000_000_000
    ) {
      let t = Timestamp::new(sec, nsec, ClockType::Monotonic);
      let d = Timespan::from_millis(ms);
      let shifted = t + d;
      prop_assert!(shifted.nsec >= 0 && shifted.nsec < NS_PER_SEC);
      prop_assert_eq!(shifted - d, t);
      prop_assert_eq!(shifted - t, d);
    }
  }
}
