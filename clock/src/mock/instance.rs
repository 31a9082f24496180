use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, Weak};
use chrono::TimeDelta;

use super::{lock, State};
use crate::op::{Kind, Op};
use crate::warn;

/// Identity and script cursor of one mock timer or ticker.
pub(crate) struct Instance {
  kind: Kind,
  no: usize,
  scripted: bool,
  // Speed at creation, used once the clock is gone
  speed: TimeDelta,
  // Resets consumed so far; script element 0 went to creation
  resets: AtomicUsize,
  clock: Weak<Mutex<State>>
}

impl Instance {
  pub(crate) fn new(kind: Kind, no: usize, scripted: bool, speed: TimeDelta, clock: Weak<Mutex<State>>) -> Instance {
    Instance { kind, no, scripted, speed, resets: AtomicUsize::new(0), clock }
  }

  pub(crate) fn no(&self) -> usize {
    self.no
  }

  pub(crate) fn clock(&self) -> &Weak<Mutex<State>> {
    &self.clock
  }

  pub(crate) fn stop(&self) {
    let op = Op::Stop(self.kind, self.no);
    match self.clock.upgrade() {
      Some(state) => lock(&state).record(op, TimeDelta::zero()),
      None => warn::clock_dropped(op)
    }
  }

  /// Records a reset requested with `d` and returns the delay to fire after.
  pub(crate) fn rearm(&self, d: TimeDelta) -> TimeDelta {
    let op = Op::Reset(self.kind, self.no);
    match self.clock.upgrade() {
      Some(state) => {
        let mut state = lock(&state);
        // Advanced under the clock lock so cursor order matches log order
        let step = self.resets.fetch_add(1, Ordering::SeqCst) + 1;
        let fire_delay = state.resolve(self.kind, self.scripted, self.no, step, d);
        state.record(op, d);
        fire_delay
      },
      None => {
        warn::clock_dropped(op);
        self.resets.fetch_add(1, Ordering::SeqCst);
        d.min(self.speed)
      }
    }
  }
}
