use std::sync::{Mutex, Weak};
use std::thread::JoinHandle;
use chrono::{DateTime, Utc};
use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::channel::select;
use log::{debug, trace};

use super::{virtual_now, State};
use crate::warn;

/// Worker forwarding a fake ticker's ticks onto a mock ticker's channel,
/// stamped with the clock's virtual instant.
///
/// Runs until cancelled or until the fake ticker goes away. Dropping the
/// relay cancels and joins it.
pub(crate) struct Relay {
  cancel: Sender<()>,
  thread: Option<JoinHandle<()>>
}

impl Relay {
  pub(crate) fn spawn(no: usize, ticks: Receiver<()>, out: Sender<DateTime<Utc>>, clock: Weak<Mutex<State>>) -> Relay {
    let (cancel, cancelled) = bounded(1);
    let thread = std::thread::Builder::new()
      .name(format!("mock ticker-{} relay", no))
      .spawn(move || {
        debug!("ticker-{} relay started", no);
        loop {
          select! {
            recv(cancelled) -> _ => break,
            recv(ticks) -> tick => match tick {
              Ok(()) => {
                let at = virtual_now(&clock).unwrap_or_else(Utc::now);
                if out.try_send(at).is_err() {
                  trace!("ticker-{} dropped a tick; receiver has not drained the last one", no);
                }
              },
              Err(_) => break
            }
          }
        }
        debug!("ticker-{} relay exited", no);
      })
      .expect("Could not spawn ticker relay");

    Relay { cancel, thread: Some(thread) }
  }
}

impl Drop for Relay {
  fn drop(&mut self) {
    let _ = self.cancel.try_send(());
    if let Some(thread) = self.thread.take() {
      if thread.join().is_err() {
        warn::worker_panicked("mock ticker relay");
      }
    }
  }
}
