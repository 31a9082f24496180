use chrono::TimeDelta;

/// Fire delay a mock timer uses when nothing is scripted for it.
pub const DEFAULT_TIMER_SPEED: TimeDelta = TimeDelta::milliseconds(1);

/// Tick period a mock ticker uses when nothing is scripted for it.
pub const DEFAULT_TICKER_SPEED: TimeDelta = TimeDelta::milliseconds(1);

/// Smallest step `MockClock::now` advances by.
pub const NOW_IOTA: TimeDelta = TimeDelta::nanoseconds(1);

pub mod time_std {
  use std::time::Duration;

  // Tickers cannot spin on a zero period
  pub const MIN_PERIOD: Duration = Duration::from_micros(1);

  // Stand-in deadline for delays too large to add to an Instant
  pub const FAR_FUTURE: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);
}
