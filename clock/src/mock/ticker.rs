use std::sync::{Mutex, PoisonError};
use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::{Receiver, Sender};

use super::relay::Relay;
use super::Instance;
use crate::driver::{self, Periodic};

/// Mock backing of a `Ticker`.
///
/// The fake ticker only signals that a tick is due; a relay worker turns each
/// signal into a virtual-time event on the public channel. Stop cancels and
/// joins the relay, a later reset starts a fresh one.
pub(crate) struct Ticker {
  instance: Instance,
  fake: Periodic,
  ticks: Receiver<()>,
  out: Sender<DateTime<Utc>>,
  relay: Mutex<Option<Relay>>
}

impl Ticker {
  pub(crate) fn new(instance: Instance, fake: Periodic, ticks: Receiver<()>, out: Sender<DateTime<Utc>>) -> Ticker {
    let relay = Relay::spawn(instance.no(), ticks.clone(), out.clone(), instance.clock().clone());
    Ticker { instance, fake, ticks, out, relay: Mutex::new(Some(relay)) }
  }

  pub(crate) fn stop(&self) {
    self.instance.stop();
    self.fake.stop();
    // Dropping the relay cancels and joins it
    self.relay.lock().unwrap_or_else(PoisonError::into_inner).take();
    // A tick signalled before the stop must not leak out after a later reset
    while self.ticks.try_recv().is_ok() {}
  }

  pub(crate) fn reset(&self, d: TimeDelta) {
    let fire_delay = self.instance.rearm(d);
    self.fake.reset(driver::period(fire_delay));
    self.relay.lock().unwrap_or_else(PoisonError::into_inner).get_or_insert_with(|| {
      Relay::spawn(self.instance.no(), self.ticks.clone(), self.out.clone(), self.instance.clock().clone())
    });
  }
}
