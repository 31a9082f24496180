use chrono::TimeDelta;

use super::Instance;
use crate::driver::{self, OneShot};

/// Mock backing of a `Timer`: records to the clock, fires through a fake timer.
pub(crate) struct Timer {
  instance: Instance,
  fake: OneShot
}

impl Timer {
  pub(crate) fn new(instance: Instance, fake: OneShot) -> Timer {
    Timer { instance, fake }
  }

  pub(crate) fn stop(&self) -> bool {
    self.instance.stop();
    self.fake.stop()
  }

  pub(crate) fn reset(&self, d: TimeDelta) -> bool {
    let fire_delay = self.instance.rearm(d);
    self.fake.reset(driver::delay(fire_delay))
  }
}
