use std::time::{Duration, Instant};

use super::{deadline_after, Fire, Schedule, Worker};

/// Resettable ticker. Periods must already be floored by `driver::period`.
pub struct Periodic {
  worker: Worker
}

impl Periodic {
  pub fn start(period: Duration, fire: Fire) -> Periodic {
    let schedule = Schedule {
      deadline: Some(deadline_after(Instant::now(), period)),
      period: Some(period),
      shutdown: false
    };
    Periodic { worker: Worker::spawn("clock ticker", schedule, fire) }
  }

  pub fn stop(&self) {
    self.worker.update(|schedule| schedule.deadline = None)
  }

  /// Changes the period and restarts the count from now, resuming a stopped ticker.
  pub fn reset(&self, period: Duration) {
    let deadline = deadline_after(Instant::now(), period);
    self.worker.update(|schedule| {
      schedule.period = Some(period);
      schedule.deadline = Some(deadline);
    })
  }
}
