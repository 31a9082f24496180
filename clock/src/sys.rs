use chrono::{DateTime, TimeDelta, Utc};
use super::Clock as ClockT;
use crate::{Ticker, Timer};

/// The host's wall clock, timers and tickers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Clock();

impl Clock {
  pub fn new() -> Clock {
    Clock()
  }
}

impl ClockT for Clock {
  fn now(&self) -> DateTime<Utc> {
    Utc::now()
  }

  fn new_timer(&self, d: TimeDelta) -> Timer {
    Timer::sys(d)
  }

  fn new_ticker(&self, d: TimeDelta) -> Ticker {
    Ticker::sys(d)
  }
}
