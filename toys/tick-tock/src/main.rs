use chrono::TimeDelta;
use clock::{Clock, SystemClock};
use crossbeam::channel::select;
use log::info;

fn main() {
  env_logger::init();
  let usage = "Usage: tick-tock <period ms> <deadline ms>";
  let mut args = std::env::args().skip(1);
  let period_ms = args.next().expect(usage).parse::<i64>().expect(usage);
  let deadline_ms = args.next().expect(usage).parse::<i64>().expect(usage);

  let clock = SystemClock::new();
  let beats = run(&clock, TimeDelta::milliseconds(period_ms), TimeDelta::milliseconds(deadline_ms));
  println!("{} beats before the deadline", beats);
}

fn run<C: Clock>(clock: &C, period: TimeDelta, deadline: TimeDelta) -> usize {
  let started = clock.now();
  let ticker = clock.new_ticker(period);
  let timeout = clock.new_timer(deadline);
  let mut beats = 0;

  loop {
    select! {
      recv(ticker.chan()) -> at => {
        beats += 1;
        if let Ok(at) = at {
          info!("tick {} at +{}", beats, at - started);
        }
      },
      recv(timeout.chan()) -> _ => break
    }
  }

  ticker.stop();
  timeout.stop();
  beats
}
