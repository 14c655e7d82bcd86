use clock::ClockType;
use deadline::DEFAULT_WAIT_CLOCK;
use log::error;

use test_harness::parse_wait_clock;
use test_harness::scenario::{self, Fixture};

fn main() {
  env_logger::init();

  let wait_clock: ClockType = match std::env::args().nth(1) {
    Some(name) => match parse_wait_clock(&name) {
      Ok(clock) => clock,
      Err(e) => {
        eprintln!("{}", e);
        std::process::exit(2);
      }
    },
    None => DEFAULT_WAIT_CLOCK
  };

  println!("Timing waits against the {} clock", wait_clock);
  let mut failed = 0;
  for (name, run) in scenario::ALL {
    let result = Fixture::new(wait_clock).and_then(|fixture| run(&fixture));
    match result {
      Ok(()) => println!("PASS {}", name),
      Err(e) => {
        error!("{} failed: {}", name, e);
        println!("FAIL {}: {}", name, e);
        failed += 1;
      }
    }
  }

  println!("{} of {} scenarios passed", scenario::ALL.len() - failed, scenario::ALL.len());
  if failed > 0 {
    std::process::exit(1);
  }
}
