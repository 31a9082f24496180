use log::warn;

use crate::op::Op;

pub fn clock_dropped(op: Op) {
  warn!("Mock clock was dropped before its handle; {} was not recorded", op)
}

pub fn worker_panicked(name: &str) {
  warn!("Clock worker '{}' panicked while firing", name)
}
