
use chrono::TimeDelta;
use crossbeam::channel::select;
use clock::{Clock, Kind, MockClock, SystemClock, TimeOp};
use harness::{ms, start};

#[derive(Debug, PartialEq)]
enum Outcome {
  Beats(usize),
  TimedOut(usize)
}

// Production-style code: waits for `want` heartbeats or gives up at the deadline.
fn await_beats<C: Clock>(clock: &C, want: usize, period: TimeDelta, deadline: TimeDelta) -> Outcome {
  let ticker = clock.new_ticker(period);
  let timeout = clock.new_timer(deadline);
  let mut beats = 0;

  let outcome = loop {
    select! {
      recv(ticker.chan()) -> _ => {
        beats += 1;
        if beats == want { break Outcome::Beats(beats) }
      },
      recv(timeout.chan()) -> _ => break Outcome::TimedOut(beats)
    }
  };

  ticker.stop();
  timeout.stop();
  outcome
}

#[test]
fn beats_arrive_before_deadline() {
  harness::init();
  let c = MockClock::new(start());
  c.set_timer_script(vec![vec![TimeDelta::hours(1)]]);

  assert_eq!(await_beats(&c, 3, TimeDelta::seconds(10), TimeDelta::minutes(1)), Outcome::Beats(3));
  assert_eq!(c.ops(), vec![
    TimeOp::ticker(TimeDelta::seconds(10)),
    TimeOp::timer(TimeDelta::minutes(1)),
    TimeOp::stop(Kind::Ticker, 1),
    TimeOp::stop(Kind::Timer, 1)
  ]);
}

#[test]
fn deadline_wins_over_slow_beats() {
  harness::init();
  let c = MockClock::new(start());
  c.set_ticker_script(vec![vec![TimeDelta::hours(1)]]);

  assert_eq!(await_beats(&c, 3, TimeDelta::seconds(10), TimeDelta::minutes(1)), Outcome::TimedOut(0));
  assert_eq!(c.ops().len(), 4);
}

#[test]
fn system_clock_drives_the_same_code() {
  harness::init();
  let outcome = await_beats(&SystemClock::new(), 2, ms(2), TimeDelta::seconds(5));
  assert_eq!(outcome, Outcome::Beats(2));
}
