use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use chrono::TimeDelta;
use log::debug;

use crate::constants::time_std::{FAR_FUTURE, MIN_PERIOD};
use crate::sync::CondMutex;
use crate::warn;

mod oneshot;
mod periodic;

pub use oneshot::OneShot;
pub use periodic::Periodic;

/// Called on the worker thread each time the schedule comes due.
pub type Fire = Box<dyn FnMut() + Send>;

/// Converts a signed delay to a host delay. Zero or negative fires at once.
pub fn delay(d: TimeDelta) -> Duration {
  d.to_std().unwrap_or(Duration::from_secs(0))
}

/// Converts a signed period to a host period, floored to `MIN_PERIOD`.
pub fn period(d: TimeDelta) -> Duration {
  delay(d).max(MIN_PERIOD)
}

fn deadline_after(now: Instant, delay: Duration) -> Instant {
  now.checked_add(delay).unwrap_or(now + FAR_FUTURE)
}

#[derive(Debug)]
struct Schedule {
  // None while stopped or after a one-shot fired
  deadline: Option<Instant>,
  // Some for tickers
  period: Option<Duration>,
  shutdown: bool
}

/// Thread behind one host timer or ticker. std has no resettable timer that
/// delivers on a channel, so the thread parks on a condvar until its
/// deadline. Reset and stop rewrite the shared schedule and wake it to
/// re-plan. Dropping the worker shuts the thread down and joins it.
struct Worker {
  name: &'static str,
  shared: Arc<CondMutex<Schedule>>,
  thread: Option<JoinHandle<()>>
}

impl Worker {
  fn spawn(name: &'static str, schedule: Schedule, mut fire: Fire) -> Worker {
    let shared = Arc::new(CondMutex::new(schedule));
    let worker_shared = Arc::clone(&shared);
    let thread = std::thread::Builder::new()
      .name(name.to_string())
      .spawn(move || {
        debug!("{} worker started", name);
        run(&worker_shared, &mut fire);
        debug!("{} worker exited", name);
      })
      .expect("Could not spawn clock worker");

    Worker { name, shared, thread: Some(thread) }
  }

  // Mutates the schedule under lock, then wakes the worker to re-plan
  fn update<R>(&self, f: impl FnOnce(&mut Schedule) -> R) -> R {
    let mut guard = self.shared.lock();
    let res = f(&mut *guard);
    guard.notify_all();
    res
  }
}

fn run(shared: &CondMutex<Schedule>, fire: &mut Fire) {
  let mut guard = shared.lock();
  loop {
    if guard.shutdown { return }
    let deadline = guard.deadline;
    match deadline {
      None => {
        guard = guard.wait();
      },
      Some(deadline) => {
        let now = Instant::now();
        if now < deadline {
          guard = guard.wait_timeout(deadline - now);
          continue;
        }

        guard.deadline = guard.period.map(|period| next_deadline(deadline, period, now));
        // Fire without the lock so stop/reset never wait on a slow receiver
        drop(guard);
        fire();
        guard = shared.lock();
      }
    }
  }
}

// Ticks that were missed are skipped rather than bunched up
fn next_deadline(last: Instant, period: Duration, now: Instant) -> Instant {
  let next = deadline_after(last, period);
  if next > now { next } else { deadline_after(now, period) }
}

impl Drop for Worker {
  fn drop(&mut self) {
    self.update(|schedule| schedule.shutdown = true);
    if let Some(thread) = self.thread.take() {
      if thread.join().is_err() {
        warn::worker_panicked(self.name);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::time::{Duration, Instant};
  use chrono::TimeDelta;
  use crate::constants::time_std::MIN_PERIOD;

  #[test]
  fn negative_delay_fires_immediately() {
    assert_eq!(super::delay(TimeDelta::milliseconds(-5)), Duration::from_secs(0));
    assert_eq!(super::delay(TimeDelta::zero()), Duration::from_secs(0));
    assert_eq!(super::delay(TimeDelta::milliseconds(5)), Duration::from_millis(5));
  }

  #[test]
  fn period_is_floored() {
    assert_eq!(super::period(TimeDelta::zero()), MIN_PERIOD);
    assert_eq!(super::period(TimeDelta::seconds(-1)), MIN_PERIOD);
    assert_eq!(super::period(TimeDelta::milliseconds(3)), Duration::from_millis(3));
  }

  #[test]
  fn missed_ticks_are_skipped() {
    let last = Instant::now();
    let period = Duration::from_millis(10);
    assert_eq!(super::next_deadline(last, period, last), last + period);

    let late = last + Duration::from_millis(35);
    assert_eq!(super::next_deadline(last, period, late), late + period);
  }

  #[test]
  fn huge_delays_do_not_overflow() {
    let now = Instant::now();
    let deadline = super::deadline_after(now, Duration::from_secs(u64::MAX));
    assert!(deadline > now);
  }
}
