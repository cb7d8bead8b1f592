//! Built-in challenge collection, served when no configuration file is supplied.

use chrono::NaiveDate;

use crate::domain::{Challenge, Difficulty, Priority, Status};

#[allow(clippy::too_many_arguments)]
fn seed(
  id: &str,
  title: &str,
  description: &str,
  icon: &str,
  category: &str,
  (difficulty, priority, status): (Difficulty, Priority, Status),
  tags: &[&str],
  (y, m, d): (i32, u32, u32),
  total_days: u32,
  completed_days: Option<u32>,
) -> Option<Challenge> {
  Some(Challenge {
    id: id.into(),
    title: title.into(),
    description: description.into(),
    icon: icon.into(),
    category: category.into(),
    banner_image: String::new(),
    difficulty,
    priority,
    status,
    tags: tags.iter().map(|t| t.to_string()).collect(),
    excel_file: format!("{id}.xlsx"),
    start_date: NaiveDate::from_ymd_opt(y, m, d)?,
    total_days,
    completed_days,
  })
}

/// Minimal set of challenges that keeps the dashboard useful without external config.
pub fn seed_challenges() -> Vec<Challenge> {
  use Difficulty::*;
  use Status::*;

  [
    seed(
      "100-days-of-code", "100 Days of Code", "Write code for at least one hour every day.",
      "Code", "Learning", (Hard, Priority::High, Active),
      &["programming", "daily", "habit"], (2025, 1, 1), 100, Some(42),
    ),
    seed(
      "morning-run", "Morning Run", "Run 5k before breakfast.",
      "Footprints", "Fitness", (Medium, Priority::Medium, Active),
      &["cardio", "morning", "health"], (2025, 2, 1), 30, Some(12),
    ),
    seed(
      "no-sugar", "No Sugar Month", "Skip added sugar for a whole month.",
      "Apple", "Nutrition", (Medium, Priority::High, Completed),
      &["health", "diet"], (2024, 11, 1), 30, Some(30),
    ),
    seed(
      "read-12-books", "Read 12 Books", "Finish one book every month.",
      "BookOpen", "Learning", (Easy, Priority::Low, Pending),
      &["reading", "habit"], (2025, 6, 1), 365, None,
    ),
    seed(
      "meditation", "Daily Meditation", "Ten minutes of mindfulness each morning.",
      "Brain", "Wellness", (Easy, Priority::Medium, Completed),
      &["mindfulness", "morning", "habit"], (2024, 12, 1), 21, Some(21),
    ),
    seed(
      "cold-showers", "Cold Showers", "End every shower with one minute of cold water.",
      "Droplets", "Wellness", (Hard, Priority::Low, Pending),
      &["health", "discipline"], (2025, 3, 15), 14, None,
    ),
  ]
  .into_iter()
  .flatten()
  .collect()
}
