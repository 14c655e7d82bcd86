//! Calls against the echo server while the wall clock jumps around them.
//!
//! Every scenario gets a fresh `Fixture`: its own clock handle with a realtime
//! offset installed on top, its own timer daemon and its own server. The
//! offset is cleared and the clock restored when the fixture drops, whether
//! or not the scenario passed.

use std::io;
use std::sync::Arc;
use std::thread::JoinHandle;

use log::info;

use clock::mock::Offset;
use clock::{ClockType, Handle, Restore, Timestamp, Timespan};
use deadline::Deadlines;

use crate::constants::*;
use crate::echo::{Channel, Context, Status, Stream};
use crate::error;

pub type Scenario = fn(&Fixture) -> io::Result<()>;

pub const ALL: &[(&str, Scenario)] = &[
  ("jump forward before stream created", jump_forward_before_stream_created),
  ("jump back before stream created", jump_back_before_stream_created),
  ("jump forward after stream created", jump_forward_after_stream_created),
  ("jump back after stream created", jump_back_after_stream_created),
  ("jump forward before server connect", jump_forward_before_server_connect),
  ("jump back before server connect", jump_back_before_server_connect),
  ("jump forward and back during call", jump_forward_and_back_during_call)
];

pub struct Fixture {
  pub deadlines: Deadlines,
  pub channel: Channel,
  offset: Arc<Offset>,
  _restore: Restore
}

impl Fixture {
  pub fn new(wait_clock: ClockType) -> io::Result<Fixture> {
    let clock = Handle::system();
    let restore = clock.scoped();
    let offset = clock.offset_realtime(Timespan::ZERO);
    let deadlines = deadline::Builder::new()
      .clock(clock)
      .wait_clock(wait_clock)
      .build()?;
    let timers = Arc::new(deadlines.timers()?);
    let channel = Channel::connect(deadlines.clone(), timers, SERVER_STARTUP)?;

    Ok(Fixture { deadlines, channel, offset, _restore: restore })
  }

  pub fn wait_clock(&self) -> ClockType {
    self.deadlines.conf().wait_clock
  }

  // Offsets replace each other rather than accumulate
  pub fn set_now_offset(&self, ms: i64) {
    info!("Wall clock jumps to {}ms off", ms);
    self.offset.set_millis(ms);
  }

  pub fn reset_now_offset(&self) {
    self.offset.clear();
  }

  /// Sets the offset from another thread once `JUMP_DELAY` has passed
  pub fn set_now_offset_later(&self, ms: i64) -> JoinHandle<()> {
    let offset = Arc::clone(&self.offset);
    std::thread::spawn(move || {
      std::thread::sleep(JUMP_DELAY);
      info!("Wall clock jumps to {}ms off", ms);
      offset.set_millis(ms);
    })
  }

  pub fn timeout_to_deadline(&self, ms: i64) -> Timestamp {
    self.deadlines.millis_to_deadline(ms)
  }

  pub fn context(&self, response_streams: usize) -> Context {
    Context {
      deadline: self.timeout_to_deadline(CALL_TIMEOUT_MS),
      response_streams
    }
  }

  fn wait_for_connected(&self) -> io::Result<bool> {
    self.channel.wait_for_connected(self.timeout_to_deadline(CONNECT_TIMEOUT_MS))
  }
}

impl Drop for Fixture {
  fn drop(&mut self) {
    self.reset_now_offset();
  }
}

fn expect(ok: bool, what: &str) -> io::Result<()> {
  if ok { Ok(()) } else { Err(error::expectation_failed(what)) }
}

fn write(stream: &Stream, msg: &str) -> io::Result<()> {
  expect(stream.write(msg)?, "write to succeed")
}

fn read_echo(stream: &Stream, msg: &str) -> io::Result<()> {
  let response = stream.read()?;
  expect(response.as_deref() == Some(msg), "the echoed message")
}

fn finish(mut stream: Stream) -> io::Result<()> {
  let status = stream.finish()?;
  expect(status == Status::Ok, "the call to finish OK")
}

fn jump_before_stream_created(f: &Fixture, offset_ms: i64) -> io::Result<()> {
  let ctx = f.context(1);
  expect(f.wait_for_connected()?, "the channel to connect")?;

  f.set_now_offset(offset_ms);
  let mut stream = f.channel.bidi_stream(ctx)?;
  write(&stream, "Hello")?;
  expect(stream.writes_done()?, "writes done to succeed")?;
  read_echo(&stream, "Hello")?;
  finish(stream)
}

fn jump_after_stream_created(f: &Fixture, offset_ms: i64) -> io::Result<()> {
  let ctx = f.context(2);
  expect(f.wait_for_connected()?, "the channel to connect")?;

  let mut stream = f.channel.bidi_stream(ctx)?;
  write(&stream, "Hello")?;
  read_echo(&stream, "Hello")?;

  f.set_now_offset(offset_ms);
  write(&stream, "World")?;
  expect(stream.writes_done()?, "writes done to succeed")?;
  read_echo(&stream, "World")?;
  finish(stream)
}

fn call_after_connect(f: &Fixture, ctx: Context) -> io::Result<()> {
  let mut stream = f.channel.bidi_stream(ctx)?;
  write(&stream, "Hello")?;
  read_echo(&stream, "Hello")?;
  write(&stream, "World")?;
  expect(stream.writes_done()?, "writes done to succeed")?;
  read_echo(&stream, "World")?;
  finish(stream)
}

pub fn jump_forward_before_stream_created(f: &Fixture) -> io::Result<()> {
  jump_before_stream_created(f, TIME_OFFSET1_MS)
}

pub fn jump_back_before_stream_created(f: &Fixture) -> io::Result<()> {
  jump_before_stream_created(f, -TIME_OFFSET1_MS)
}

pub fn jump_forward_after_stream_created(f: &Fixture) -> io::Result<()> {
  jump_after_stream_created(f, TIME_OFFSET1_MS)
}

pub fn jump_back_after_stream_created(f: &Fixture) -> io::Result<()> {
  jump_after_stream_created(f, -TIME_OFFSET1_MS)
}

/// The jump lands while the connection wait is pending and is larger than the
/// connect timeout. A wait timed against the wall clock gives up; one timed
/// against the monotonic clock connects as soon as the server is up.
pub fn jump_forward_before_server_connect(f: &Fixture) -> io::Result<()> {
  let ctx = f.context(2);
  let jump = f.set_now_offset_later(TIME_OFFSET2_MS);
  let connected = f.wait_for_connected()?;
  jump.join().map_err(|_| error::jump_thread_panicked())?;

  match f.wait_clock() {
    ClockType::Monotonic => {
      expect(connected, "a monotonic wait to connect despite the jump")?;
      call_after_connect(f, ctx)
    },
    _ => expect(!connected, "a wall-clock wait to expire after the jump")
  }
}

pub fn jump_back_before_server_connect(f: &Fixture) -> io::Result<()> {
  let ctx = f.context(2);
  let jump = f.set_now_offset_later(-TIME_OFFSET2_MS);
  let connected = f.wait_for_connected()?;
  jump.join().map_err(|_| error::jump_thread_panicked())?;

  expect(connected, "the channel to connect")?;
  call_after_connect(f, ctx)
}

pub fn jump_forward_and_back_during_call(f: &Fixture) -> io::Result<()> {
  let ctx = f.context(2);
  expect(f.wait_for_connected()?, "the channel to connect")?;

  let mut stream = f.channel.bidi_stream(ctx)?;
  write(&stream, "Hello")?;

  f.set_now_offset(-TIME_OFFSET2_MS);
  read_echo(&stream, "Hello")?;

  f.set_now_offset(TIME_OFFSET1_MS);
  write(&stream, "World")?;

  f.set_now_offset(-TIME_OFFSET2_MS);
  expect(stream.writes_done()?, "writes done to succeed")?;

  f.set_now_offset(-TIME_OFFSET2_MS);
  read_echo(&stream, "World")?;

  f.set_now_offset(-TIME_OFFSET2_MS);
  finish(stream)
}
