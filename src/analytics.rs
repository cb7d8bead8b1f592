//! Analytics page: the statistics snapshot plus time-bucketed views derived from the
//! challenge dates.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::domain::{Challenge, Status};
use crate::stats::{compute_statistics, Statistics};

pub const TIMELINE_DAYS: u32 = 30;
pub const PROGRESS_MONTHS: u32 = 6;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePoint {
  pub date: NaiveDate,
  /// Challenges whose `[start, end]` span contains `date`.
  pub in_progress: usize,
  /// Completed challenges whose end date is `date`.
  pub completed: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyProgress {
  pub month: String,
  pub completed: usize,
  pub total: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsReport {
  #[serde(flatten)]
  pub statistics: Statistics,
  pub average_completion_days: f64,
  pub activity_timeline: Vec<TimelinePoint>,
  pub monthly_progress: Vec<MonthlyProgress>,
}

pub fn build_report(challenges: &[Challenge], today: NaiveDate) -> AnalyticsReport {
  AnalyticsReport {
    statistics: compute_statistics(challenges),
    average_completion_days: average_completion_days(challenges),
    activity_timeline: activity_timeline(challenges, today, TIMELINE_DAYS),
    monthly_progress: monthly_progress(challenges, today, PROGRESS_MONTHS),
  }
}

/// Mean `total_days` of completed challenges, 0 when nothing is completed.
pub fn average_completion_days(challenges: &[Challenge]) -> f64 {
  let (count, sum) = challenges
    .iter()
    .filter(|c| c.status == Status::Completed)
    .fold((0u64, 0u64), |(n, s), c| (n + 1, s + u64::from(c.total_days)));
  if count == 0 { 0.0 } else { sum as f64 / count as f64 }
}

/// One point per day for the `days` days ending at `today`, oldest first.
pub fn activity_timeline(challenges: &[Challenge], today: NaiveDate, days: u32) -> Vec<TimelinePoint> {
  let spans: Vec<(NaiveDate, NaiveDate, Status)> =
    challenges.iter().map(|c| (c.start_date, c.end_date(), c.status)).collect();

  (0..i64::from(days))
    .rev()
    .map(|back| {
      let date = today - Duration::days(back);
      let in_progress = spans.iter().filter(|(s, e, _)| *s <= date && date <= *e).count();
      let completed =
        spans.iter().filter(|(_, e, st)| *st == Status::Completed && *e == date).count();
      TimelinePoint { date, in_progress, completed }
    })
    .collect()
}

/// One bucket per calendar month for the `months` months ending with today's month,
/// oldest first. A challenge lands in the month of its end date.
pub fn monthly_progress(challenges: &[Challenge], today: NaiveDate, months: u32) -> Vec<MonthlyProgress> {
  let current = today.year() * 12 + today.month0() as i32;
  (0..months as i32)
    .rev()
    .map(|back| {
      let index = current - back;
      let (year, month0) = (index.div_euclid(12), index.rem_euclid(12) as u32);
      let in_month: Vec<&Challenge> = challenges
        .iter()
        .filter(|c| {
          let end = c.end_date();
          end.year() == year && end.month0() == month0
        })
        .collect();
      MonthlyProgress {
        month: NaiveDate::from_ymd_opt(year, month0 + 1, 1)
          .map(|d| d.format("%b %Y").to_string())
          .unwrap_or_default(),
        completed: in_month.iter().filter(|c| c.status == Status::Completed).count(),
        total: in_month.len(),
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
  }

  fn sample() -> Vec<Challenge> {
    vec![
      Challenge::fixture("a", "Run", Status::Active, "2025-01-01", 10),
      Challenge::fixture("b", "Swim", Status::Completed, "2025-01-05", 5),
      Challenge::fixture("c", "Read", Status::Completed, "2024-12-01", 21),
      Challenge::fixture("d", "Cook", Status::Pending, "2025-02-01", 7),
    ]
  }

  #[test]
  fn average_completion_ignores_unfinished() {
    assert_eq!(average_completion_days(&sample()), 13.0);
    assert_eq!(average_completion_days(&[]), 0.0);
  }

  #[test]
  fn timeline_covers_requested_window_oldest_first() {
    let points = activity_timeline(&sample(), d(2025, 1, 10), 7);
    assert_eq!(points.len(), 7);
    assert_eq!(points[0].date, d(2025, 1, 4));
    assert_eq!(points[6].date, d(2025, 1, 10));
    // Jan 9: Run (Jan 1..10) and Swim (Jan 5..9) both in progress; Swim ends that day.
    let jan9 = &points[5];
    assert_eq!(jan9.in_progress, 2);
    assert_eq!(jan9.completed, 1);
    assert_eq!(points[6].in_progress, 1);
    assert_eq!(points[6].completed, 0);
  }

  #[test]
  fn monthly_buckets_by_end_date_across_year_boundary() {
    let months = monthly_progress(&sample(), d(2025, 2, 15), 3);
    let labels: Vec<&str> = months.iter().map(|m| m.month.as_str()).collect();
    assert_eq!(labels, ["Dec 2024", "Jan 2025", "Feb 2025"]);
    assert_eq!((months[0].completed, months[0].total), (1, 1));
    assert_eq!((months[1].completed, months[1].total), (1, 2));
    assert_eq!((months[2].completed, months[2].total), (0, 1));
  }

  #[test]
  fn report_flattens_statistics() {
    let json = serde_json::to_value(build_report(&sample(), d(2025, 1, 10))).unwrap();
    assert_eq!(json["totalChallenges"], 4);
    assert_eq!(json["activityTimeline"].as_array().unwrap().len(), TIMELINE_DAYS as usize);
    assert_eq!(json["monthlyProgress"].as_array().unwrap().len(), PROGRESS_MONTHS as usize);
  }
}
