use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::{bounded, Receiver};

use crate::driver::{self, Periodic};
use crate::mock;
use crate::timer::deliver;

enum Backing {
  Sys(Periodic),
  Mock(mock::Ticker)
}

/// Periodic ticker handle.
///
/// Ticks arrive on `chan()`; a tick that finds the previous one unread is
/// dropped. As with `Timer`, stopping leaves the channel open.
pub struct Ticker {
  chan: Receiver<DateTime<Utc>>,
  backing: Backing
}

impl Ticker {
  pub(crate) fn sys(d: TimeDelta) -> Ticker {
    let (tx, rx) = bounded(1);
    let fake = Periodic::start(driver::period(d), deliver(tx, Utc::now));
    Ticker { chan: rx, backing: Backing::Sys(fake) }
  }

  pub(crate) fn mock(chan: Receiver<DateTime<Utc>>, ticker: mock::Ticker) -> Ticker {
    Ticker { chan, backing: Backing::Mock(ticker) }
  }

  pub fn chan(&self) -> &Receiver<DateTime<Utc>> {
    &self.chan
  }

  /// Stops the ticker and restarts it with period `d`, counted from now.
  pub fn reset(&self, d: TimeDelta) {
    match &self.backing {
      Backing::Sys(ticker) => ticker.reset(driver::period(d)),
      Backing::Mock(ticker) => ticker.reset(d)
    }
  }

  pub fn stop(&self) {
    match &self.backing {
      Backing::Sys(ticker) => ticker.stop(),
      Backing::Mock(ticker) => ticker.stop()
    }
  }
}
