use std::fmt;
use chrono::TimeDelta;

/// Which family of handle an operation belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
  Timer,
  Ticker
}

impl Kind {
  pub fn as_str(self) -> &'static str {
    match self {
      Kind::Timer => "timer",
      Kind::Ticker => "ticker"
    }
  }
}

impl fmt::Display for Kind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// A single clock operation. Handle ops carry the 1-based creation index
/// of the handle within its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
  Now,
  New(Kind),
  Stop(Kind, usize),
  Reset(Kind, usize)
}

impl fmt::Display for Op {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Op::Now => f.write_str("now"),
      Op::New(kind) => write!(f, "{}", kind),
      Op::Stop(kind, no) => write!(f, "{}-{}.stop", kind, no),
      Op::Reset(kind, no) => write!(f, "{}-{}.reset", kind, no)
    }
  }
}

/// One entry of the mock clock's operation log.
///
/// `duration` is what the caller asked for (or the advance, for `now`),
/// never the delay the mock actually used to fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeOp {
  pub op: Op,
  pub duration: TimeDelta
}

impl TimeOp {
  pub fn new(op: Op, duration: TimeDelta) -> TimeOp {
    TimeOp { op, duration }
  }

  pub fn now(advance: TimeDelta) -> TimeOp {
    TimeOp::new(Op::Now, advance)
  }

  pub fn timer(requested: TimeDelta) -> TimeOp {
    TimeOp::new(Op::New(Kind::Timer), requested)
  }

  pub fn ticker(requested: TimeDelta) -> TimeOp {
    TimeOp::new(Op::New(Kind::Ticker), requested)
  }

  pub fn stop(kind: Kind, no: usize) -> TimeOp {
    TimeOp::new(Op::Stop(kind, no), TimeDelta::zero())
  }

  pub fn reset(kind: Kind, no: usize, requested: TimeDelta) -> TimeOp {
    TimeOp::new(Op::Reset(kind, no), requested)
  }

  /// The string tag of the op, e.g. `"ticker-2.reset"`.
  pub fn tag(&self) -> String {
    self.op.to_string()
  }
}

impl fmt::Display for TimeOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.op, self.duration)
  }
}
