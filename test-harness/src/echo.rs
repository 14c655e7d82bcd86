use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, trace, warn};

use clock::Timestamp;
use deadline::{Deadlines, Event, Signal, TimerId, Timers, WaitOutcome};

/// How a call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
  Ok,
  DeadlineExceeded,
  Unavailable
}

#[derive(Debug, Clone, Copy)]
pub struct Context {
  pub deadline: Timestamp,
  // The server echoes at most this many requests
  pub response_streams: usize
}

struct CallState {
  responses: VecDeque<String>,
  sent: usize,
  server_done: bool,
  status: Option<Status>
}

type Call = Signal<CallState>;

/// Client end of an in-process echo server
pub struct Channel {
  up: Arc<Event>,
  deadlines: Deadlines,
  timers: Arc<Timers>
}

impl Channel {
  /// Starts an echo server that accepts calls once `startup` has passed
  pub fn connect(deadlines: Deadlines, timers: Arc<Timers>, startup: Duration) -> io::Result<Channel> {
    let up = Arc::new(Event::new());
    let server_up = Arc::clone(&up);
    std::thread::Builder::new()
      .name("echo server".to_string())
      .spawn(move || {
        std::thread::sleep(startup);
        debug!("Echo server up after {:?}", startup);
        if let Err(e) = server_up.signal() {
          warn!("Echo server could not announce itself: {}", e);
        }
      })?;

    Ok(Channel { up, deadlines, timers })
  }

  pub fn wait_for_connected(&self, deadline: Timestamp) -> io::Result<bool> {
    self.up.wait_until(&self.deadlines, deadline)
  }

  /// Starts a call. Calls started before the server is up fail as Unavailable.
  pub fn bidi_stream(&self, ctx: Context) -> io::Result<Stream> {
    let call = Arc::new(Signal::new(CallState {
      responses: VecDeque::new(),
      sent: 0,
      server_done: false,
      status: None
    }));
    let mut stream = Stream {
      call: Arc::clone(&call),
      requests: None,
      timer: None,
      ctx,
      deadlines: self.deadlines.clone(),
      timers: Arc::clone(&self.timers)
    };

    if !self.up.is_signaled()? {
      call.lock()?.status = Some(Status::Unavailable);
      return Ok(stream);
    }

    let (tx, rx) = channel::unbounded();
    let server_call = Arc::clone(&call);
    std::thread::Builder::new()
      .name("echo call".to_string())
      .spawn(move || {
        if let Err(e) = serve(rx, &server_call, ctx.response_streams) {
          warn!("Echo call failed: {}", e);
        }
      })?;

    stream.requests = Some(tx);
    stream.timer = Some(self.timers.add(ctx.deadline, move |at| expire(&call, at))?);
    Ok(stream)
  }
}

// None marks the end of the client's writes
fn serve(rx: Receiver<Option<String>>, call: &Call, response_streams: usize) -> io::Result<()> {
  for request in rx.iter() {
    let mut state = call.lock()?;
    match request {
      Some(msg) => if state.sent < response_streams {
        trace!("Echoing {:?}", msg);
        state.sent += 1;
        state.responses.push_back(msg);
      },
      None => state.server_done = true
    }
    state.notify_all();
    if state.server_done {
      break;
    }
  }
  Ok(())
}

fn expire(call: &Call, at: Timestamp) {
  match call.lock() {
    Ok(mut state) => {
      if state.status.is_none() && !state.server_done {
        debug!("Call deadline exceeded at {}", at);
        state.status = Some(Status::DeadlineExceeded);
        state.notify_all();
      }
    },
    Err(e) => warn!("Could not expire call: {}", e)
  }
}

/// A bidirectional streaming call
pub struct Stream {
  call: Arc<Call>,
  requests: Option<Sender<Option<String>>>,
  timer: Option<TimerId>,
  ctx: Context,
  deadlines: Deadlines,
  timers: Arc<Timers>
}

impl Stream {
  fn is_open(&self) -> io::Result<bool> {
    Ok(self.call.lock()?.status.is_none())
  }

  pub fn write(&self, msg: &str) -> io::Result<bool> {
    if !self.is_open()? {
      return Ok(false);
    }
    Ok(self.requests.as_ref()
      .map(|tx| tx.send(Some(msg.to_string())).is_ok())
      .unwrap_or(false))
  }

  pub fn writes_done(&mut self) -> io::Result<bool> {
    if !self.is_open()? {
      return Ok(false);
    }
    Ok(self.requests.take()
      .map(|tx| tx.send(None).is_ok())
      .unwrap_or(false))
  }

  /// Next response, or None once the call is over or its deadline passed
  pub fn read(&self) -> io::Result<Option<String>> {
    let state = self.call.lock()?;
    let (mut state, outcome) = self.deadlines.wait_until(state, self.ctx.deadline, |s| {
      !s.responses.is_empty() || s.server_done || s.status.is_some()
    })?;

    if outcome == WaitOutcome::Expired && state.status.is_none() {
      state.status = Some(Status::DeadlineExceeded);
    }
    if state.status.is_some() {
      return Ok(None);
    }
    Ok(state.responses.pop_front())
  }

  /// Waits for the server to end the call
  pub fn finish(&mut self) -> io::Result<Status> {
    let state = self.call.lock()?;
    let (mut state, outcome) = self.deadlines.wait_until(state, self.ctx.deadline, |s| {
      s.server_done || s.status.is_some()
    })?;

    if outcome == WaitOutcome::Expired && state.status.is_none() {
      state.status = Some(Status::DeadlineExceeded);
    }
    let status = *state.status.get_or_insert(Status::Ok);
    drop(state);

    self.cancel_timer();
    Ok(status)
  }

  fn cancel_timer(&mut self) {
    if let Some(timer) = self.timer.take() {
      if let Err(e) = self.timers.cancel(timer) {
        warn!("Could not cancel call deadline: {}", e);
      }
    }
  }
}

impl Drop for Stream {
  fn drop(&mut self) {
    self.cancel_timer();
  }
}
