use std::time::{Duration, Instant};

use super::{deadline_after, Fire, Schedule, Worker};

/// Resettable one-shot timer.
pub struct OneShot {
  worker: Worker
}

impl OneShot {
  pub fn start(delay: Duration, fire: Fire) -> OneShot {
    let schedule = Schedule {
      deadline: Some(deadline_after(Instant::now(), delay)),
      period: None,
      shutdown: false
    };
    OneShot { worker: Worker::spawn("clock timer", schedule, fire) }
  }

  /// Disarms the timer. True if this call prevented a pending fire.
  pub fn stop(&self) -> bool {
    self.worker.update(|schedule| schedule.deadline.take().is_some())
  }

  /// Re-arms the timer to fire after `delay`. True if it was still pending.
  pub fn reset(&self, delay: Duration) -> bool {
    let deadline = deadline_after(Instant::now(), delay);
    self.worker.update(|schedule| schedule.deadline.replace(deadline).is_some())
  }
}
