//! Day-granular date arithmetic for challenges.
//!
//! Every function takes "now" explicitly. The only place that reads the wall clock is
//! `state::system_now`, called once per request at the handler boundary.
//!
//! Elapsed days round the time since the start day's midnight up to whole days, so any
//! instant after midnight of day D counts day D as elapsed. Remaining days compare
//! calendar dates.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// `start + (total_days - 1)` days.
///
/// `total_days` must be at least 1 and the end must fit on the calendar
/// (see `checked_end_date`). Loaded challenges are validated before they reach this
/// function; anything else is a caller bug and is not clamped.
pub fn end_date(start: NaiveDate, total_days: u32) -> NaiveDate {
  debug_assert!(total_days >= 1, "end_date called with total_days = 0");
  start + Duration::days(i64::from(total_days) - 1)
}

/// `end_date`, or `None` when `total_days` is 0 or the end is past `NaiveDate::MAX`.
pub fn checked_end_date(start: NaiveDate, total_days: u32) -> Option<NaiveDate> {
  let offset = i64::from(total_days.checked_sub(1)?);
  start.checked_add_signed(Duration::days(offset))
}

/// Days since midnight of `start`, rounded up; 0 for any `now` at or before it.
pub fn days_elapsed(start: NaiveDate, now: NaiveDateTime) -> i64 {
  let millis = (now - start.and_time(NaiveTime::MIN)).num_milliseconds();
  if millis <= 0 {
    0
  } else {
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
  }
}

/// Signed whole days until `end`: 0 on the end date, negative once it has passed.
pub fn days_remaining(end: NaiveDate, today: NaiveDate) -> i64 {
  (end - today).num_days()
}

/// `"Jan 5, 2025"`.
pub fn format_display_date(date: NaiveDate) -> String {
  date.format("%b %-d, %Y").to_string()
}

/// Time-based progress, `elapsed / total` as a percentage capped at 100.
pub fn elapsed_progress(days_elapsed: i64, total_days: u32) -> f64 {
  percent_of(days_elapsed, total_days)
}

/// Manual progress from the `completedDays` counter, clamped to `0..=100`.
pub fn manual_progress(completed_days: u32, total_days: u32) -> f64 {
  percent_of(i64::from(completed_days), total_days)
}

fn percent_of(part: i64, total_days: u32) -> f64 {
  if total_days == 0 {
    return 0.0;
  }
  (part as f64 / f64::from(total_days) * 100.0).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn at(y: i32, m: u32, day: u32, h: u32, min: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(h, min, 0).unwrap()
  }

  #[test]
  fn end_date_is_inclusive_of_start_day() {
    assert_eq!(end_date(d(2025, 1, 1), 1), d(2025, 1, 1));
    assert_eq!(end_date(d(2025, 1, 1), 10), d(2025, 1, 10));
    // crosses a month and a leap day
    assert_eq!(end_date(d(2024, 2, 20), 14), d(2024, 3, 4));
    for n in 1..=400u32 {
      let end = end_date(d(2025, 6, 15), n);
      assert_eq!((end - d(2025, 6, 15)).num_days(), i64::from(n) - 1);
    }
  }

  #[test]
  fn checked_end_date_rejects_overflow_and_zero() {
    assert_eq!(checked_end_date(d(2025, 1, 1), 10), Some(d(2025, 1, 10)));
    assert_eq!(checked_end_date(d(2025, 1, 1), 0), None);
    assert_eq!(checked_end_date(d(2025, 1, 1), u32::MAX), None);
    assert_eq!(checked_end_date(NaiveDate::MAX, 1), Some(NaiveDate::MAX));
    assert_eq!(checked_end_date(NaiveDate::MAX, 2), None);
  }

  #[test]
  fn days_elapsed_is_zero_until_start_then_counts_up() {
    let start = d(2025, 3, 10);
    assert_eq!(days_elapsed(start, at(2025, 1, 1, 12, 0)), 0);
    assert_eq!(days_elapsed(start, at(2025, 3, 9, 23, 59)), 0);
    assert_eq!(days_elapsed(start, at(2025, 3, 10, 0, 0)), 0);
    assert_eq!(days_elapsed(start, at(2025, 4, 9, 0, 0)), 30);
  }

  #[test]
  fn days_elapsed_rounds_partial_days_up() {
    let start = d(2025, 3, 10);
    assert_eq!(days_elapsed(start, at(2025, 3, 10, 0, 1)), 1);
    assert_eq!(days_elapsed(start, at(2025, 3, 10, 15, 30)), 1);
    assert_eq!(days_elapsed(start, at(2025, 3, 11, 0, 0)), 1);
    assert_eq!(days_elapsed(start, at(2025, 3, 11, 8, 0)), 2);
    // a 10-day challenge is fully elapsed during its last day
    assert_eq!(elapsed_progress(days_elapsed(start, at(2025, 3, 19, 9, 0)), 10), 100.0);
  }

  #[test]
  fn days_remaining_is_signed() {
    let end = d(2025, 1, 10);
    assert_eq!(days_remaining(end, end), 0);
    assert_eq!(days_remaining(end, d(2025, 1, 7)), 3);
    assert_eq!(days_remaining(end, d(2025, 1, 13)), -3);
  }

  #[test]
  fn display_format_is_short_month_day_year() {
    assert_eq!(format_display_date(d(2025, 1, 5)), "Jan 5, 2025");
    assert_eq!(format_display_date(d(2024, 12, 31)), "Dec 31, 2024");
  }

  #[test]
  fn progress_metrics_are_clamped() {
    assert_eq!(elapsed_progress(0, 10), 0.0);
    assert_eq!(elapsed_progress(5, 10), 50.0);
    assert_eq!(elapsed_progress(25, 10), 100.0);
    assert_eq!(manual_progress(3, 12), 25.0);
    assert_eq!(manual_progress(40, 30), 100.0);
    assert_eq!(manual_progress(0, 0), 0.0);
  }
}
