//! Domain models: the challenge record and its closed vocabularies (status, difficulty, priority).

use std::{fmt, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, DashboardResult};
use crate::temporal;

/// Generates `as_str`, `Display` and a strict `FromStr` for a lowercase-named enum.
/// Declaration order is the rank order used for sorting and grouping.
macro_rules! named_enum {
  ($ty:ident, $field:literal, { $($variant:ident => $name:literal),+ $(,)? }) => {
    impl $ty {
      pub fn as_str(self) -> &'static str {
        match self { $($ty::$variant => $name),+ }
      }
    }

    impl fmt::Display for $ty {
      fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
      }
    }

    impl FromStr for $ty {
      type Err = DashboardError;

      fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
          $($name => Ok($ty::$variant),)+
          other => Err(DashboardError::InvalidValue {
            field: $field,
            value: other.to_string(),
            expected: concat!($($name, " "),+),
          }),
        }
      }
    }
  };
}

/// Lifecycle state. Supplied as input, never derived from dates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Active,
  Pending,
  Completed,
}
named_enum!(Status, "status", { Active => "active", Pending => "pending", Completed => "completed" });

impl Status {
  pub const ALL: [Status; 3] = [Status::Active, Status::Pending, Status::Completed];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}
named_enum!(Difficulty, "difficulty", { Easy => "easy", Medium => "medium", Hard => "hard" });

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
  Low,
  Medium,
  High,
}
named_enum!(Priority, "priority", { Low => "low", Medium => "medium", High => "high" });

/// One tracked goal. Never mutated after the collection is loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
  pub id: String,
  pub title: String,
  pub description: String,
  #[serde(default)] pub icon: String,
  pub category: String,
  #[serde(default)] pub banner_image: String,
  pub difficulty: Difficulty,
  pub priority: Priority,
  pub status: Status,
  #[serde(default)] pub tags: Vec<String>,
  pub excel_file: String,
  pub start_date: NaiveDate,
  /// Inclusive of the start day; always >= 1 for a loaded challenge.
  pub total_days: u32,
  /// Manual progress counter, meaningful for active challenges only. May exceed `total_days`.
  #[serde(default)] pub completed_days: Option<u32>,
}

impl Challenge {
  /// Recomputed on every call, there is no stored end date.
  pub fn end_date(&self) -> NaiveDate {
    temporal::end_date(self.start_date, self.total_days)
  }

  /// Checks the invariants the rest of the pipeline relies on.
  pub fn validate(&self) -> DashboardResult<()> {
    if self.total_days == 0 {
      return Err(DashboardError::NonPositiveDuration(0));
    }
    if temporal::checked_end_date(self.start_date, self.total_days).is_none() {
      return Err(DashboardError::DurationOutOfRange {
        start: self.start_date.to_string(),
        total_days: i64::from(self.total_days),
      });
    }
    if self.id.trim().is_empty() {
      return Err(DashboardError::InvalidValue {
        field: "id",
        value: self.id.clone(),
        expected: "a non-empty identifier",
      });
    }
    Ok(())
  }
}

#[cfg(test)]
impl Challenge {
  /// Minimal challenge for unit tests; tweak the returned value's fields as needed.
  pub(crate) fn fixture(id: &str, title: &str, status: Status, start: &str, total_days: u32) -> Self {
    Challenge {
      id: id.to_string(),
      title: title.to_string(),
      description: String::new(),
      icon: String::new(),
      category: "General".to_string(),
      banner_image: String::new(),
      difficulty: Difficulty::Medium,
      priority: Priority::Medium,
      status,
      tags: Vec::new(),
      excel_file: format!("{id}.csv"),
      start_date: parse_date(start).expect("fixture date"),
      total_days,
      completed_days: None,
    }
  }
}

/// Parses a calendar date in `YYYY-MM-DD` form.
pub fn parse_date(value: &str) -> DashboardResult<NaiveDate> {
  NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|e| DashboardError::InvalidDate {
    value: value.to_string(),
    reason: e.to_string(),
  })
}
