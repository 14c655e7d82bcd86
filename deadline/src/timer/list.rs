use std::cmp::Ordering;

use clock::Timestamp;

/// Pending timers sorted soonest first, then by id.
/// Removal only marks an entry dead. Dead entries are dropped when they
/// expire, or all at once when they outnumber the live ones.
/// Every deadline in one list must come from the same clock.
pub struct TimerList<T: Ord + Copy> {
  timers: Vec<(Timestamp, T, bool)>,
  dead: usize
}

pub struct Expired<'a, T> {
  items: std::vec::Drain<'a, (Timestamp, T, bool)>
}

impl<'a, T> Iterator for Expired<'a, T> {
  type Item = (Timestamp, T);

  fn next(&mut self) -> Option<(Timestamp, T)> {
    self.items.by_ref()
      .find(|(_, _, is_live)| *is_live)
      .map(|(when, what, _)| (when, what))
  }
}

impl<T: Ord + Copy> TimerList<T> {
  pub fn new() -> TimerList<T> {
    TimerList { timers: vec![], dead: 0 }
  }

  fn find(&self, what: T, when: Timestamp) -> Result<usize, usize> {
    self.timers.binary_search_by(|(existing_when, existing_what, _)| {
      match existing_when.cmp(&when) {
        Ordering::Equal => existing_what.cmp(&what),
        unequal => unequal
      }
    })
  }

  // Adding a timer that is already pending is ignored
  pub fn add(&mut self, what: T, when: Timestamp) {
    match self.find(what, when) {
      Ok(idx) => {
        if !self.timers[idx].2 {
          self.timers[idx].2 = true;
          self.dead -= 1;
        }
      },
      Err(idx) => self.timers.insert(idx, (when, what, true))
    }
  }

  pub fn remove(&mut self, what: T, when: Timestamp) {
    if let Ok(idx) = self.find(what, when) {
      if self.timers[idx].2 {
        self.timers[idx].2 = false;
        self.dead += 1;
      }
    }
    if self.dead * 2 > self.timers.len() {
      self.timers.retain(|(_, _, is_live)| *is_live);
      self.dead = 0;
    }
  }

  pub fn when_next(&self) -> Option<Timestamp> {
    self.timers.iter()
      .find(|(_, _, is_live)| *is_live)
      .map(|(when, _, _)| *when)
  }

  pub fn live(&self) -> usize {
    self.timers.len() - self.dead
  }

  /// Drains every timer due at or before `now`, soonest first
  pub fn expire(&mut self, now: Timestamp) -> Expired<T> {
    let due = self.timers.partition_point(|(when, _, _)| *when <= now);
    self.dead -= self.timers[..due].iter().filter(|(_, _, is_live)| !*is_live).count();
    Expired { items: self.timers.drain(..due) }
  }
}

impl<T: Ord + Copy> Default for TimerList<T> {
  fn default() -> TimerList<T> {
    TimerList::new()
  }
}
