//! Wall-clock task scheduling.
//!
//! An explicit task list with precomputed due-times, polled by a short tick
//! loop in `main`. Each task's [`Task::tick`] is a pure due-decision plus
//! advance against an injected clock; the side-effecting body runs to
//! completion before the next check, so tasks never run concurrently with
//! each other or with themselves.

use chrono::{DateTime, Duration, NaiveTime, TimeZone as _, Utc};
use chrono_tz::Tz;

/// How often a task recurs.
#[derive(Debug, Clone, Copy)]
pub enum Cadence {
  /// A fixed interval from the previous run.
  Every(Duration),
  /// Once per day at a fixed local wall-clock time.
  DailyAt(NaiveTime),
}

/// One periodic task: a name for logging plus its next due instant.
#[derive(Debug)]
pub struct Task {
  pub name: &'static str,
  cadence:  Cadence,
  tz:       Tz,
  next_due: DateTime<Utc>,
}

impl Task {
  /// Create a task. Interval tasks first fire one full interval after
  /// `now`; daily tasks fire at the next occurrence of their wall-clock
  /// time in `tz`.
  pub fn new(
    name: &'static str,
    cadence: Cadence,
    tz: Tz,
    now: DateTime<Utc>,
  ) -> Self {
    let next_due = next_due_after(cadence, tz, now);
    Self {
      name,
      cadence,
      tz,
      next_due,
    }
  }

  /// Report whether the task is due at `now` and, if so, advance its due
  /// time. The caller runs the task body iff this returns `true`.
  pub fn tick(&mut self, now: DateTime<Utc>) -> bool {
    if now < self.next_due {
      return false;
    }
    self.next_due = next_due_after(self.cadence, self.tz, now);
    true
  }

  #[cfg(test)]
  fn next_due(&self) -> DateTime<Utc> {
    self.next_due
  }
}

fn next_due_after(cadence: Cadence, tz: Tz, after: DateTime<Utc>) -> DateTime<Utc> {
  match cadence {
    Cadence::Every(interval) => after + interval,
    Cadence::DailyAt(at) => next_daily(at, tz, after),
  }
}

/// The next instant strictly after `after` whose local wall-clock time in
/// `tz` is `at`. Skips wall-clock times that do not exist on a DST
/// transition day; an ambiguous time resolves to its earlier occurrence.
fn next_daily(at: NaiveTime, tz: Tz, after: DateTime<Utc>) -> DateTime<Utc> {
  let mut date = after.with_timezone(&tz).date_naive();
  loop {
    if let Some(candidate) =
      tz.from_local_datetime(&date.and_time(at)).earliest()
    {
      let candidate = candidate.with_timezone(&Utc);
      if candidate > after {
        return candidate;
      }
    }
    date = match date.succ_opt() {
      Some(next) => next,
      None => return after + Duration::days(1),
    };
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use chrono::TimeZone;
  use chrono_tz::Europe::Berlin;

  use super::*;

  fn summary_time() -> NaiveTime {
    NaiveTime::from_hms_opt(5, 59, 0).unwrap()
  }

  #[test]
  fn interval_task_fires_then_advances() {
    let start = Utc.with_ymd_and_hms(2024, 12, 1, 12, 0, 0).unwrap();
    let mut task = Task::new(
      "check",
      Cadence::Every(Duration::minutes(15)),
      Berlin,
      start,
    );

    assert!(!task.tick(start));
    assert!(!task.tick(start + Duration::minutes(14)));
    assert!(task.tick(start + Duration::minutes(15)));
    // Not due again right after running.
    assert!(!task.tick(start + Duration::minutes(16)));
    assert!(task.tick(start + Duration::minutes(31)));
  }

  #[test]
  fn daily_task_fires_at_local_time() {
    // 05:59 Berlin in December (CET) is 04:59 UTC.
    let start = Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap();
    let mut task =
      Task::new("summary", Cadence::DailyAt(summary_time()), Berlin, start);

    assert!(!task.tick(Utc.with_ymd_and_hms(2024, 12, 1, 4, 58, 0).unwrap()));
    assert!(task.tick(Utc.with_ymd_and_hms(2024, 12, 1, 4, 59, 0).unwrap()));
    // Next occurrence is tomorrow, not later today.
    assert!(!task.tick(Utc.with_ymd_and_hms(2024, 12, 1, 5, 30, 0).unwrap()));
    assert!(task.tick(Utc.with_ymd_and_hms(2024, 12, 2, 4, 59, 0).unwrap()));
  }

  #[test]
  fn daily_task_created_after_todays_time_waits_for_tomorrow() {
    let start = Utc.with_ymd_and_hms(2024, 12, 1, 10, 0, 0).unwrap();
    let task =
      Task::new("summary", Cadence::DailyAt(summary_time()), Berlin, start);

    assert_eq!(
      task.next_due(),
      Utc.with_ymd_and_hms(2024, 12, 2, 4, 59, 0).unwrap()
    );
  }

  #[test]
  fn daily_task_skips_nonexistent_dst_time() {
    // Berlin springs forward 2024-03-31 02:00 → 03:00; 02:30 never occurs.
    let start = Utc.with_ymd_and_hms(2024, 3, 30, 12, 0, 0).unwrap();
    let half_past_two = NaiveTime::from_hms_opt(2, 30, 0).unwrap();
    let task =
      Task::new("summary", Cadence::DailyAt(half_past_two), Berlin, start);

    // 2024-04-01 02:30 CEST is 00:30 UTC.
    assert_eq!(
      task.next_due(),
      Utc.with_ymd_and_hms(2024, 4, 1, 0, 30, 0).unwrap()
    );
  }
}
