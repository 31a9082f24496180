use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use chrono::{DateTime, TimeDelta, Utc};
use crossbeam::channel::bounded;
use log::trace;

use super::Clock as ClockT;
use crate::constants::{DEFAULT_TICKER_SPEED, DEFAULT_TIMER_SPEED, NOW_IOTA};
use crate::driver::{self, OneShot, Periodic};
use crate::op::{Kind, Op, TimeOp};
use crate::timer::deliver;

mod instance;
mod relay;
mod ticker;
mod timer;

use instance::Instance;
pub(crate) use ticker::Ticker;
pub(crate) use timer::Timer;

/// Scripts and default speeds of a mock clock.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
  pub now_script: Vec<TimeDelta>,
  pub timer_script: Vec<Vec<TimeDelta>>,
  pub ticker_script: Vec<Vec<TimeDelta>>,
  pub timer_speed: TimeDelta,
  pub ticker_speed: TimeDelta
}

impl Default for Config {
  fn default() -> Config {
    Config {
      now_script: vec![],
      timer_script: vec![],
      ticker_script: vec![],
      timer_speed: DEFAULT_TIMER_SPEED,
      ticker_speed: DEFAULT_TICKER_SPEED
    }
  }
}

impl Config {
  fn script(&self, kind: Kind) -> &[Vec<TimeDelta>] {
    match kind {
      Kind::Timer => &self.timer_script,
      Kind::Ticker => &self.ticker_script
    }
  }

  fn speed(&self, kind: Kind) -> TimeDelta {
    match kind {
      Kind::Timer => self.timer_speed,
      Kind::Ticker => self.ticker_speed
    }
  }
}

#[derive(Debug)]
pub(crate) struct State {
  now: DateTime<Utc>,
  conf: Config,
  now_count: usize,
  timer_count: usize,
  ticker_count: usize,
  ops: Vec<TimeOp>
}

pub(crate) type SharedState = Arc<Mutex<State>>;

pub(crate) fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
  state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Virtual instant seen by a handle's fire events, if its clock is still alive.
pub(crate) fn virtual_now(state: &Weak<Mutex<State>>) -> Option<DateTime<Utc>> {
  state.upgrade().map(|state| lock(&state).now)
}

impl State {
  pub(crate) fn record(&mut self, op: Op, duration: TimeDelta) {
    trace!("mock clock: {} {}", op, duration);
    self.ops.push(TimeOp::new(op, duration));
  }

  fn advance(&mut self) -> DateTime<Utc> {
    self.now_count += 1;
    let d = match self.conf.now_script.get(self.now_count - 1) {
      Some(&d) if d > TimeDelta::zero() => d,
      _ => NOW_IOTA
    };
    self.now = self.now + d;
    self.record(Op::Now, d);
    self.now
  }

  // Returns the creation index, whether a script is bound to it, and its first fire delay
  fn create(&mut self, kind: Kind, requested: TimeDelta) -> (usize, bool, TimeDelta) {
    let count = match kind {
      Kind::Timer => &mut self.timer_count,
      Kind::Ticker => &mut self.ticker_count
    };
    *count += 1;
    let no = *count;

    let scripted = no <= self.conf.script(kind).len();
    let fire_delay = self.resolve(kind, scripted, no, 0, requested);
    self.record(Op::New(kind), requested);
    (no, scripted, fire_delay)
  }

  /// Fire delay for step `step` of instance `no`: its script entry when one
  /// exists, otherwise `requested` capped at the kind's speed.
  pub(crate) fn resolve(&self, kind: Kind, scripted: bool, no: usize, step: usize, requested: TimeDelta) -> TimeDelta {
    let fallback = requested.min(self.conf.speed(kind));
    if !scripted { return fallback }

    self.conf.script(kind)
      .get(no - 1)
      .and_then(|script| script.get(step))
      .copied()
      .unwrap_or(fallback)
  }
}

/// Scriptable clock recording every operation made against it.
///
/// `now()` advances a virtual instant by the next `now_script` entry, or by
/// one nanosecond when the entry is missing or not positive. The i-th timer
/// created takes its initial delay from `timer_script[i][0]` and the delay
/// of its k-th reset from `timer_script[i][k]`; tickers work the same. A
/// handle with no entry fires after `min(requested, speed)` of real time.
/// Fire events carry the virtual instant and are not logged.
///
/// Clones share the same state and log. Handles keep only a weak reference,
/// so their stop/reset calls are recorded only while a clone is alive.
#[derive(Debug, Clone)]
pub struct Clock {
  state: SharedState
}

impl Clock {
  pub fn new(now: DateTime<Utc>) -> Clock {
    Clock::with_config(now, Config::default())
  }

  pub fn with_config(now: DateTime<Utc>, conf: Config) -> Clock {
    Clock {
      state: Arc::new(Mutex::new(State {
        now,
        conf,
        now_count: 0,
        timer_count: 0,
        ticker_count: 0,
        ops: vec![]
      }))
    }
  }

  /// Edits the configuration in place. Consumed script positions stay consumed.
  pub fn configure<F: FnOnce(&mut Config)>(&self, f: F) {
    f(&mut lock(&self.state).conf)
  }

  pub fn config(&self) -> Config {
    lock(&self.state).conf.clone()
  }

  pub fn set_now_script(&self, script: Vec<TimeDelta>) {
    self.configure(|conf| conf.now_script = script)
  }

  pub fn set_timer_script(&self, script: Vec<Vec<TimeDelta>>) {
    self.configure(|conf| conf.timer_script = script)
  }

  pub fn set_ticker_script(&self, script: Vec<Vec<TimeDelta>>) {
    self.configure(|conf| conf.ticker_script = script)
  }

  pub fn set_timer_speed(&self, speed: TimeDelta) {
    self.configure(|conf| conf.timer_speed = speed)
  }

  pub fn set_ticker_speed(&self, speed: TimeDelta) {
    self.configure(|conf| conf.ticker_speed = speed)
  }

  /// Snapshot of the operation log, oldest first.
  pub fn ops(&self) -> Vec<TimeOp> {
    lock(&self.state).ops.clone()
  }

  pub(crate) fn instance(&self, kind: Kind, requested: TimeDelta) -> (Instance, TimeDelta) {
    let mut state = lock(&self.state);
    let (no, scripted, fire_delay) = state.create(kind, requested);
    let speed = state.conf.speed(kind);
    (Instance::new(kind, no, scripted, speed, Arc::downgrade(&self.state)), fire_delay)
  }
}

impl ClockT for Clock {
  /// Advances the virtual instant by the next scripted step and returns it.
  fn now(&self) -> DateTime<Utc> {
    lock(&self.state).advance()
  }

  fn new_timer(&self, d: TimeDelta) -> crate::Timer {
    let (instance, fire_delay) = self.instance(Kind::Timer, d);
    let (tx, rx) = bounded(1);
    let clock = Arc::downgrade(&self.state);
    let fake = OneShot::start(driver::delay(fire_delay), deliver(tx, move || {
      virtual_now(&clock).unwrap_or_else(Utc::now)
    }));
    crate::Timer::mock(rx, Timer::new(instance, fake))
  }

  fn new_ticker(&self, d: TimeDelta) -> crate::Ticker {
    let (instance, fire_delay) = self.instance(Kind::Ticker, d);
    let (tx, rx) = bounded(1);
    let (ticks_tx, ticks) = bounded(1);
    let fake = Periodic::start(driver::period(fire_delay), Box::new(move || {
      let _ = ticks_tx.try_send(());
    }));
    crate::Ticker::mock(rx, Ticker::new(instance, fake, ticks, tx))
  }
}

#[cfg(test)]
mod tests {
  use super::{Clock, Config};
  use crate::constants::NOW_IOTA;
  use crate::{Clock as ClockT, Kind, TimeOp};
  use chrono::{DateTime, TimeDelta, TimeZone, Utc};

  fn start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 2, 1, 23, 24, 25).unwrap()
  }

  fn ns(n: i64) -> TimeDelta {
    TimeDelta::nanoseconds(n)
  }

  #[test]
  fn unscripted_now_advances_by_iota() {
    let c = Clock::new(start());
    assert_eq!(c.now(), start() + NOW_IOTA);
    assert_eq!(c.ops(), vec![TimeOp::now(ns(1))]);
  }

  #[test]
  fn scripted_now() {
    let c = Clock::new(start());
    c.set_now_script(vec![ns(100), ns(0)]);
    assert_eq!(c.now(), start() + ns(100), "#1");
    assert_eq!(c.now(), start() + ns(101), "#2");
    assert_eq!(c.now(), start() + ns(102), "#3");
    assert_eq!(c.ops(), vec![TimeOp::now(ns(100)), TimeOp::now(ns(1)), TimeOp::now(ns(1))]);
  }

  #[test]
  fn negative_now_entry_falls_back() {
    let c = Clock::new(start());
    c.set_now_script(vec![ns(-50), TimeDelta::seconds(2)]);
    assert_eq!(c.now(), start() + ns(1));
    assert_eq!(c.now(), start() + ns(1) + TimeDelta::seconds(2));
  }

  #[test]
  fn script_set_between_calls_keeps_position() {
    let c = Clock::new(start());
    c.now();
    c.set_now_script(vec![ns(10), ns(20)]);
    // Position 1 was consumed by the first call
    assert_eq!(c.now(), start() + ns(21));
  }

  #[test]
  fn creation_resolves_script_then_speed() {
    let c = Clock::with_config(start(), Config {
      timer_script: vec![vec![], vec![ns(5), ns(-3)]],
      timer_speed: TimeDelta::milliseconds(2),
      ..Config::default()
    });
    let mut state = super::lock(&c.state);

    // Bound but empty script: capped request
    assert_eq!(state.create(Kind::Timer, TimeDelta::seconds(1)), (1, true, TimeDelta::milliseconds(2)));
    assert_eq!(state.create(Kind::Timer, TimeDelta::seconds(1)), (2, true, ns(5)));
    assert_eq!(state.resolve(Kind::Timer, true, 2, 1, TimeDelta::seconds(1)), ns(-3));
    assert_eq!(state.resolve(Kind::Timer, true, 2, 2, TimeDelta::seconds(1)), TimeDelta::milliseconds(2));
    // Requests below the speed are kept
    assert_eq!(state.resolve(Kind::Timer, true, 2, 2, ns(7)), ns(7));
    // Unbound instance
    assert_eq!(state.create(Kind::Timer, TimeDelta::seconds(1)), (3, false, TimeDelta::milliseconds(2)));
  }

  #[test]
  fn each_kind_caps_at_its_own_speed() {
    let c = Clock::new(start());
    c.set_ticker_speed(TimeDelta::hours(1));
    let state = super::lock(&c.state);
    assert_eq!(state.resolve(Kind::Ticker, false, 1, 0, TimeDelta::hours(2)), TimeDelta::hours(1));
    assert_eq!(state.resolve(Kind::Timer, false, 1, 0, TimeDelta::hours(2)), crate::DEFAULT_TIMER_SPEED);
  }

  #[test]
  fn clones_share_state() {
    let c = Clock::new(start());
    let other = c.clone();
    other.set_now_script(vec![ns(10)]);
    assert_eq!(other.now(), start() + ns(10));
    assert_eq!(c.now(), start() + ns(11));
    assert_eq!(c.ops(), vec![TimeOp::now(ns(10)), TimeOp::now(ns(1))]);
  }

  #[test]
  fn kinds_count_independently() {
    let c = Clock::new(start());
    let mut state = super::lock(&c.state);
    assert_eq!(state.create(Kind::Timer, ns(1)).0, 1);
    assert_eq!(state.create(Kind::Ticker, ns(1)).0, 1);
    assert_eq!(state.create(Kind::Timer, ns(1)).0, 2);
    assert_eq!(state.create(Kind::Ticker, ns(1)).0, 2);
  }

  #[test]
  fn config_round_trip() {
    let c = Clock::new(start());
    assert_eq!(c.config(), Config::default());
    c.set_ticker_speed(TimeDelta::milliseconds(3));
    c.set_timer_speed(TimeDelta::milliseconds(4));
    c.set_ticker_script(vec![vec![ns(1)]]);
    c.set_timer_script(vec![vec![ns(2)]]);
    let conf = c.config();
    assert_eq!(conf.ticker_speed, TimeDelta::milliseconds(3));
    assert_eq!(conf.timer_speed, TimeDelta::milliseconds(4));
    assert_eq!(conf.ticker_script, vec![vec![ns(1)]]);
    assert_eq!(conf.timer_script, vec![vec![ns(2)]]);
    assert!(c.ops().is_empty());
  }
}
