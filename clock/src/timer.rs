use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::{bounded, Receiver, Sender};
use log::trace;

use crate::driver::{self, Fire, OneShot};
use crate::mock;

enum Backing {
  Sys(OneShot),
  Mock(mock::Timer)
}

/// One-shot timer handle.
///
/// Fires once on `chan()` with the time it went off. Stopping does not
/// close the channel: a receive already blocked on a stopped timer waits
/// until the timer is reset or dropped.
pub struct Timer {
  chan: Receiver<DateTime<Utc>>,
  backing: Backing
}

impl Timer {
  pub(crate) fn sys(d: TimeDelta) -> Timer {
    let (tx, rx) = bounded(1);
    let fake = OneShot::start(driver::delay(d), deliver(tx, Utc::now));
    Timer { chan: rx, backing: Backing::Sys(fake) }
  }

  pub(crate) fn mock(chan: Receiver<DateTime<Utc>>, timer: mock::Timer) -> Timer {
    Timer { chan, backing: Backing::Mock(timer) }
  }

  pub fn chan(&self) -> &Receiver<DateTime<Utc>> {
    &self.chan
  }

  /// Re-arms the timer to fire after `d`. Returns true if the timer was
  /// still pending, false if it had already fired or been stopped.
  pub fn reset(&self, d: TimeDelta) -> bool {
    match &self.backing {
      Backing::Sys(timer) => timer.reset(driver::delay(d)),
      Backing::Mock(timer) => timer.reset(d)
    }
  }

  /// Prevents the timer from firing. Returns true if this call stopped a
  /// pending timer.
  pub fn stop(&self) -> bool {
    match &self.backing {
      Backing::Sys(timer) => timer.stop(),
      Backing::Mock(timer) => timer.stop()
    }
  }
}

/// Fire callback that offers `at()` to a capacity-1 channel, dropping the
/// event when the previous one is still unread.
pub(crate) fn deliver<F>(tx: Sender<DateTime<Utc>>, at: F) -> Fire
where F: 'static + Fn() -> DateTime<Utc> + Send {
  Box::new(move || {
    if tx.try_send(at()).is_err() {
      trace!("Dropped fire event; receiver has not drained the last one");
    }
  })
}

#[cfg(test)]
mod tests {
  use crate::{Clock, SystemClock};
  use chrono::{TimeDelta, Utc};
  use crossbeam::channel::RecvTimeoutError;
  use std::time::Duration;

  const WAIT: Duration = Duration::from_secs(5);

  #[test]
  fn fires_with_wall_time() {
    let clock = SystemClock::new();
    let before = Utc::now();
    let timer = clock.new_timer(TimeDelta::milliseconds(5));
    let fired = timer.chan().recv_timeout(WAIT).expect("Timer never fired");
    assert!(fired - before >= TimeDelta::milliseconds(5));
  }

  #[test]
  fn does_not_fire_early() {
    let clock = SystemClock::new();
    let timer = clock.new_timer(TimeDelta::milliseconds(200));
    assert_eq!(timer.chan().recv_timeout(Duration::from_millis(50)), Err(RecvTimeoutError::Timeout));

    assert!(timer.reset(TimeDelta::milliseconds(5)), "1st reset");
    timer.chan().recv_timeout(WAIT).expect("Timer never fired after reset");

    assert!(!timer.reset(TimeDelta::milliseconds(50)));
    assert!(timer.stop());
    assert_eq!(timer.chan().recv_timeout(Duration::from_millis(80)), Err(RecvTimeoutError::Timeout));
  }

  #[test]
  fn stopped_timer_keeps_channel_open() {
    let clock = SystemClock::new();
    let timer = clock.new_timer(TimeDelta::hours(1));
    assert!(timer.stop());
    assert_eq!(timer.chan().recv_timeout(Duration::from_millis(10)), Err(RecvTimeoutError::Timeout));
  }

  #[test]
  fn negative_duration_fires_immediately() {
    let clock = SystemClock::new();
    let timer = clock.new_timer(TimeDelta::seconds(-1));
    timer.chan().recv_timeout(WAIT).expect("Timer never fired");
  }
}
