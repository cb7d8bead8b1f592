//! Filter + sort pipeline over a challenge collection.
//!
//! `apply_filter_and_sort` never touches the caller's slice: matching challenges are cloned
//! into a fresh vector and sorted there. Sorting uses `sort_by`, which is stable, so
//! challenges with equal keys keep their input order in both directions.

use std::{cmp::Ordering, collections::BTreeSet, fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

use crate::domain::{Challenge, Difficulty, Priority, Status};
use crate::error::DashboardError;
use crate::util::{cmp_ignore_case, contains_ignore_case};

/// Either the `"all"` sentinel or an exact value to match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Choice<T> {
  All,
  Only(T),
}

impl<T> Default for Choice<T> {
  fn default() -> Self {
    Choice::All
  }
}

impl<T: PartialEq> Choice<T> {
  pub fn admits(&self, value: &T) -> bool {
    match self {
      Choice::All => true,
      Choice::Only(wanted) => wanted == value,
    }
  }

  pub fn is_all(&self) -> bool {
    matches!(self, Choice::All)
  }
}

impl<T: FromStr> FromStr for Choice<T> {
  type Err = T::Err;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    if s == "all" {
      Ok(Choice::All)
    } else {
      s.parse().map(Choice::Only)
    }
  }
}

impl<T: fmt::Display> Serialize for Choice<T> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      Choice::All => serializer.serialize_str("all"),
      Choice::Only(v) => serializer.collect_str(v),
    }
  }
}

impl<'de, T> Deserialize<'de> for Choice<T>
where
  T: FromStr,
  T::Err: fmt::Display,
{
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(de::Error::custom)
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
  StartDate,
  EndDate,
  Status,
  Title,
  Difficulty,
  Priority,
}

impl FromStr for SortKey {
  type Err = DashboardError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "startDate" => Ok(SortKey::StartDate),
      "endDate" => Ok(SortKey::EndDate),
      "status" => Ok(SortKey::Status),
      "title" => Ok(SortKey::Title),
      "difficulty" => Ok(SortKey::Difficulty),
      "priority" => Ok(SortKey::Priority),
      other => Err(DashboardError::InvalidValue {
        field: "sortBy",
        value: other.to_string(),
        expected: "startDate endDate status title difficulty priority",
      }),
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
  #[serde(rename = "asc")]
  Ascending,
  #[serde(rename = "desc")]
  Descending,
}

impl FromStr for SortOrder {
  type Err = DashboardError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "asc" | "ascending" => Ok(SortOrder::Ascending),
      "desc" | "descending" => Ok(SortOrder::Descending),
      other => Err(DashboardError::InvalidValue {
        field: "sortOrder",
        value: other.to_string(),
        expected: "asc desc",
      }),
    }
  }
}

/// Current query configuration. The default shows everything, newest start date first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterState {
  pub status: Choice<Status>,
  pub category: Choice<String>,
  pub difficulty: Choice<Difficulty>,
  pub priority: Choice<Priority>,
  /// Any-of: a challenge passes when it carries at least one of these tags.
  pub tags: Vec<String>,
  pub search: String,
  pub sort_by: SortKey,
  pub sort_order: SortOrder,
}

impl Default for FilterState {
  fn default() -> Self {
    Self {
      status: Choice::All,
      category: Choice::All,
      difficulty: Choice::All,
      priority: Choice::All,
      tags: Vec::new(),
      search: String::new(),
      sort_by: SortKey::StartDate,
      sort_order: SortOrder::Descending,
    }
  }
}

impl FilterState {
  /// True when any predicate is narrowing the collection (sorting does not count).
  pub fn has_active_filters(&self) -> bool {
    !self.status.is_all()
      || !self.category.is_all()
      || !self.difficulty.is_all()
      || !self.priority.is_all()
      || !self.tags.is_empty()
      || !self.search.is_empty()
  }

  pub fn matches(&self, c: &Challenge) -> bool {
    self.status.admits(&c.status)
      && self.category.admits(&c.category)
      && self.difficulty.admits(&c.difficulty)
      && self.priority.admits(&c.priority)
      && self.matches_tags(c)
      && self.matches_search(c)
  }

  fn matches_tags(&self, c: &Challenge) -> bool {
    self.tags.is_empty() || self.tags.iter().any(|t| c.tags.contains(t))
  }

  fn matches_search(&self, c: &Challenge) -> bool {
    if self.search.is_empty() {
      return true;
    }
    let needle = self.search.to_lowercase();
    contains_ignore_case(&c.title, &needle)
      || contains_ignore_case(&c.description, &needle)
      || c.tags.iter().any(|t| contains_ignore_case(t, &needle))
  }
}

type Comparator = fn(&Challenge, &Challenge) -> Ordering;

fn by_start_date(a: &Challenge, b: &Challenge) -> Ordering {
  a.start_date.cmp(&b.start_date)
}

fn by_end_date(a: &Challenge, b: &Challenge) -> Ordering {
  a.end_date().cmp(&b.end_date())
}

fn by_status(a: &Challenge, b: &Challenge) -> Ordering {
  a.status.cmp(&b.status)
}

fn by_title(a: &Challenge, b: &Challenge) -> Ordering {
  cmp_ignore_case(&a.title, &b.title)
}

fn by_difficulty(a: &Challenge, b: &Challenge) -> Ordering {
  a.difficulty.cmp(&b.difficulty)
}

fn by_priority(a: &Challenge, b: &Challenge) -> Ordering {
  a.priority.cmp(&b.priority)
}

fn comparator(key: SortKey) -> Comparator {
  match key {
    SortKey::StartDate => by_start_date,
    SortKey::EndDate => by_end_date,
    SortKey::Status => by_status,
    SortKey::Title => by_title,
    SortKey::Difficulty => by_difficulty,
    SortKey::Priority => by_priority,
  }
}

/// Filters `challenges` with every predicate in `filter` (logical AND), then sorts a copy.
pub fn apply_filter_and_sort(challenges: &[Challenge], filter: &FilterState) -> Vec<Challenge> {
  let mut out: Vec<Challenge> = challenges.iter().filter(|c| filter.matches(c)).cloned().collect();
  let cmp = comparator(filter.sort_by);
  match filter.sort_order {
    SortOrder::Ascending => out.sort_by(cmp),
    SortOrder::Descending => out.sort_by(|a, b| cmp(a, b).reverse()),
  }
  out
}

/// Distinct values offered by the filter controls, sorted.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct FilterOptions {
  pub categories: Vec<String>,
  pub tags: Vec<String>,
}

pub fn filter_options(challenges: &[Challenge]) -> FilterOptions {
  let categories: BTreeSet<&str> = challenges.iter().map(|c| c.category.as_str()).collect();
  let tags: BTreeSet<&str> = challenges.iter().flat_map(|c| c.tags.iter().map(String::as_str)).collect();
  FilterOptions {
    categories: categories.into_iter().map(str::to_string).collect(),
    tags: tags.into_iter().map(str::to_string).collect(),
  }
}
