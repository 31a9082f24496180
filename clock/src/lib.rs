use std::sync::Arc;
use chrono::{DateTime, TimeDelta, Utc};

mod constants;
mod driver;
mod op;
mod sync;
mod ticker;
mod timer;
mod warn;

pub mod sys;
pub mod mock;

pub use constants::{DEFAULT_TICKER_SPEED, DEFAULT_TIMER_SPEED};
pub use op::{Kind, Op, TimeOp};
pub use ticker::Ticker;
pub use timer::Timer;

pub use sys::Clock as SystemClock;
pub use mock::Clock as MockClock;

/// Wall clock plus the timers and tickers derived from it.
///
/// Code that needs time should take a `Clock` instead of reaching for
/// `Utc::now()` or spawning its own sleeps, so tests can hand it a
/// `MockClock` and assert on the recorded operations.
pub trait Clock {
  fn now(&self) -> DateTime<Utc>;

  /// One-shot timer firing once on its channel after `d`.
  fn new_timer(&self, d: TimeDelta) -> Timer;

  /// Ticker firing on its channel every `d` until stopped.
  fn new_ticker(&self, d: TimeDelta) -> Ticker;
}

impl<C: Clock + ?Sized> Clock for &C {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
  fn new_timer(&self, d: TimeDelta) -> Timer { (**self).new_timer(d) }
  fn new_ticker(&self, d: TimeDelta) -> Ticker { (**self).new_ticker(d) }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
  fn new_timer(&self, d: TimeDelta) -> Timer { (**self).new_timer(d) }
  fn new_ticker(&self, d: TimeDelta) -> Ticker { (**self).new_ticker(d) }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
  fn new_timer(&self, d: TimeDelta) -> Timer { (**self).new_timer(d) }
  fn new_ticker(&self, d: TimeDelta) -> Ticker { (**self).new_ticker(d) }
}
