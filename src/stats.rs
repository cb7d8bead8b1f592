//! Aggregate statistics over a challenge collection.
//!
//! Grouped counts use `BTreeMap` so serialization order is deterministic: categories are
//! ordered by name, difficulty and priority by severity (easy..hard, low..high).

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Challenge, Difficulty, Priority, Status};

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
  pub total_challenges: usize,
  pub active_challenges: usize,
  pub completed_challenges: usize,
  pub pending_challenges: usize,
  /// Percentage in `0..=100`; 0 for an empty collection.
  pub completion_rate: f64,
  pub category_counts: BTreeMap<String, usize>,
  pub difficulty_counts: BTreeMap<Difficulty, usize>,
  pub priority_counts: BTreeMap<Priority, usize>,
}

/// Single pass over `challenges`.
pub fn compute_statistics(challenges: &[Challenge]) -> Statistics {
  let mut stats = Statistics { total_challenges: challenges.len(), ..Statistics::default() };

  for c in challenges {
    match c.status {
      Status::Active => stats.active_challenges += 1,
      Status::Pending => stats.pending_challenges += 1,
      Status::Completed => stats.completed_challenges += 1,
    }
    *stats.category_counts.entry(c.category.clone()).or_insert(0) += 1;
    *stats.difficulty_counts.entry(c.difficulty).or_insert(0) += 1;
    *stats.priority_counts.entry(c.priority).or_insert(0) += 1;
  }

  if stats.total_challenges > 0 {
    stats.completion_rate =
      stats.completed_challenges as f64 / stats.total_challenges as f64 * 100.0;
  }
  stats
}
