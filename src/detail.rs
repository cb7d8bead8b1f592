//! Per-challenge detail values shown on the challenge page and the cards.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::domain::{Challenge, Status};
use crate::temporal::{
  days_elapsed, days_remaining, elapsed_progress, format_display_date, manual_progress,
};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeDetail {
  pub end_date: NaiveDate,
  pub start_date_display: String,
  pub end_date_display: String,
  pub days_elapsed: i64,
  /// Signed: negative once the end date has passed.
  pub days_remaining: i64,
  /// `days_remaining` floored at 0 for display.
  pub days_remaining_display: i64,
  /// Date-derived progress, `days_elapsed / total_days`.
  pub elapsed_progress: f64,
  /// `completed_days / total_days`, only for active challenges that track it.
  pub manual_progress: Option<f64>,
}

impl ChallengeDetail {
  pub fn derive(c: &Challenge, now: NaiveDateTime) -> Self {
    let end = c.end_date();
    let elapsed = days_elapsed(c.start_date, now);
    let remaining = days_remaining(end, now.date());
    Self {
      end_date: end,
      start_date_display: format_display_date(c.start_date),
      end_date_display: format_display_date(end),
      days_elapsed: elapsed,
      days_remaining: remaining,
      days_remaining_display: remaining.max(0),
      elapsed_progress: elapsed_progress(elapsed, c.total_days),
      manual_progress: card_progress(c),
    }
  }
}

/// Manual progress as shown on a challenge card.
pub fn card_progress(c: &Challenge) -> Option<f64> {
  match (c.status, c.completed_days) {
    (Status::Active, Some(done)) => Some(manual_progress(done, c.total_days)),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn noon(y: i32, m: u32, day: u32) -> NaiveDateTime {
    d(y, m, day).and_hms_opt(12, 0, 0).unwrap()
  }

  #[test]
  fn mid_challenge_detail() {
    let mut c = Challenge::fixture("a", "Run", Status::Active, "2025-01-01", 10);
    c.completed_days = Some(3);
    let detail = ChallengeDetail::derive(&c, noon(2025, 1, 6));
    assert_eq!(detail.end_date, d(2025, 1, 10));
    assert_eq!(detail.start_date_display, "Jan 1, 2025");
    assert_eq!(detail.end_date_display, "Jan 10, 2025");
    assert_eq!(detail.days_elapsed, 6);
    assert_eq!(detail.days_remaining, 4);
    assert_eq!(detail.elapsed_progress, 60.0);
    assert_eq!(detail.manual_progress, Some(30.0));
  }

  #[test]
  fn finished_challenge_keeps_signed_remaining_but_clamps_display() {
    let c = Challenge::fixture("b", "Swim", Status::Completed, "2025-01-05", 5);
    let detail = ChallengeDetail::derive(&c, noon(2025, 1, 12));
    assert_eq!(detail.days_remaining, -3);
    assert_eq!(detail.days_remaining_display, 0);
    assert_eq!(detail.elapsed_progress, 100.0);
    assert_eq!(detail.manual_progress, None);
  }

  #[test]
  fn future_challenge_has_no_elapsed_days() {
    let c = Challenge::fixture("c", "Read", Status::Pending, "2025-03-01", 30);
    let detail = ChallengeDetail::derive(&c, noon(2025, 2, 1));
    assert_eq!(detail.days_elapsed, 0);
    assert_eq!(detail.elapsed_progress, 0.0);
    assert_eq!(detail.days_remaining, 57);
  }

  #[test]
  fn first_and_last_day_count_as_elapsed() {
    let c = Challenge::fixture("e", "Run", Status::Active, "2025-01-01", 10);

    let first = ChallengeDetail::derive(&c, noon(2025, 1, 1));
    assert_eq!(first.days_elapsed, 1);
    assert_eq!(first.days_remaining, 9);
    assert_eq!(first.elapsed_progress, 10.0);

    let last = ChallengeDetail::derive(&c, noon(2025, 1, 10));
    assert_eq!(last.days_elapsed, 10);
    assert_eq!(last.days_remaining, 0);
    assert_eq!(last.elapsed_progress, 100.0);

    let start_midnight = ChallengeDetail::derive(&c, d(2025, 1, 1).and_hms_opt(0, 0, 0).unwrap());
    assert_eq!(start_midnight.days_elapsed, 0);
  }

  #[test]
  fn card_progress_needs_active_status_and_counter() {
    let mut c = Challenge::fixture("d", "Write", Status::Active, "2025-01-01", 20);
    assert_eq!(card_progress(&c), None);
    c.completed_days = Some(25);
    assert_eq!(card_progress(&c), Some(100.0));
    c.status = Status::Pending;
    assert_eq!(card_progress(&c), None);
  }
}
