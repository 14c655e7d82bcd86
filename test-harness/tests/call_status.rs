use clock::{ClockType, Timespan};
use test_harness::constants::CONNECT_TIMEOUT_MS;
use test_harness::echo::{Context, Status};

mod harness;

fn call_outlives_its_deadline(wait_clock: ClockType) {
  let f = harness::fixture(wait_clock);
  let connected = f.channel.wait_for_connected(f.timeout_to_deadline(CONNECT_TIMEOUT_MS)).expect("Could not wait");
  assert!(connected);

  // The server echoes one request, so the second read can only end at the deadline
  let ctx = Context { deadline: f.timeout_to_deadline(150), response_streams: 1 };
  let mut stream = f.channel.bidi_stream(ctx).expect("Could not start call");
  assert!(stream.write("Hello").expect("Could not write"));
  assert_eq!(stream.read().expect("Could not read").as_deref(), Some("Hello"));
  assert!(stream.write("World").expect("Could not write"));

  let started = f.deadlines.now(ClockType::Monotonic);
  assert_eq!(stream.read().expect("Could not read"), None);
  let waited = f.deadlines.now(ClockType::Monotonic) - started;
  assert!(waited < Timespan::from_millis(5_000), "Pending read hung for {}", waited);
  assert!(f.deadlines.is_expired(ctx.deadline));

  assert!(!stream.write("Again").expect("Could not write"));
  assert_eq!(stream.finish().expect("Could not finish"), Status::DeadlineExceeded);
}

#[test]
fn deadline_exceeded_on_monotonic_wait() {
  call_outlives_its_deadline(ClockType::Monotonic);
}

#[test]
fn deadline_exceeded_on_realtime_wait() {
  call_outlives_its_deadline(ClockType::Realtime);
}

#[test]
fn deadline_exceeded_despite_a_backward_jump() {
  let f = harness::fixture(ClockType::Realtime);
  let connected = f.channel.wait_for_connected(f.timeout_to_deadline(CONNECT_TIMEOUT_MS)).expect("Could not wait");
  assert!(connected);

  let ctx = Context { deadline: f.timeout_to_deadline(150), response_streams: 0 };
  let mut stream = f.channel.bidi_stream(ctx).expect("Could not start call");
  assert!(stream.write("Hello").expect("Could not write"));
  f.set_now_offset(-5678);

  // The call deadline is monotonic, so the jump neither extends nor ends it
  assert_eq!(stream.finish().expect("Could not finish"), Status::DeadlineExceeded);
}

#[test]
fn call_before_server_is_up_is_unavailable() {
  let f = harness::fixture(ClockType::Monotonic);
  let mut stream = f.channel.bidi_stream(f.context(1)).expect("Could not start call");

  assert!(!stream.write("Hello").expect("Could not write"));
  assert!(!stream.writes_done().expect("Could not finish writing"));
  assert_eq!(stream.read().expect("Could not read"), None);
  assert_eq!(stream.finish().expect("Could not finish"), Status::Unavailable);
}
