use std::io;

use clock::ClockType;
use test_harness::scenario::{Fixture, Scenario};

pub fn init() {
  let _ = env_logger::builder().is_test(true).try_init();
}

pub fn fixture(wait_clock: ClockType) -> Fixture {
  init();
  Fixture::new(wait_clock).expect("Could not build fixture")
}

pub fn run(wait_clock: ClockType, scenario: Scenario) -> io::Result<()> {
  init();
  let fixture = Fixture::new(wait_clock)?;
  scenario(&fixture)
}
