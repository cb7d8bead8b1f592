//! Loading dashboard configuration (challenge collection + table settings) from TOML.
//!
//! Entries are parsed loosely (strings) and validated one by one, so a single bad entry is
//! reported and skipped instead of rejecting the whole file.

use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{parse_date, Challenge};
use crate::error::{DashboardError, DashboardResult};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DashboardConfig {
  #[serde(default)]
  pub tables: TablesCfg,
  #[serde(default)]
  pub challenges: Vec<ChallengeCfg>,
}

/// Where `excel_file` references are resolved. `base_url` wins over `dir` when both are set.
#[derive(Clone, Debug, Deserialize, Default)]
pub struct TablesCfg {
  #[serde(default)] pub dir: Option<String>,
  #[serde(default)] pub base_url: Option<String>,
  #[serde(default)] pub fallback_days: Option<u32>,
}

/// Challenge entry accepted in TOML configuration.
#[derive(Clone, Debug, Deserialize)]
pub struct ChallengeCfg {
  #[serde(default)] pub id: Option<String>,
  pub title: String,
  #[serde(default)] pub description: String,
  #[serde(default)] pub icon: String,
  pub category: String,
  #[serde(default)] pub banner_image: String,
  pub difficulty: String,
  pub priority: String,
  pub status: String,
  #[serde(default)] pub tags: Vec<String>,
  pub excel_file: String,
  pub start_date: String,
  pub total_days: i64,
  #[serde(default)] pub completed_days: Option<i64>,
}

impl ChallengeCfg {
  /// Validates the entry and converts it; a missing id gets a fresh UUID.
  pub fn into_challenge(self) -> DashboardResult<Challenge> {
    if self.total_days < 1 {
      return Err(DashboardError::NonPositiveDuration(self.total_days));
    }
    let start_date = parse_date(&self.start_date)?;
    let total_days = u32::try_from(self.total_days).map_err(|_| DashboardError::DurationOutOfRange {
      start: start_date.to_string(),
      total_days: self.total_days,
    })?;
    let completed_days = match self.completed_days {
      None => None,
      Some(n) => Some(u32::try_from(n).map_err(|_| DashboardError::InvalidValue {
        field: "completed_days",
        value: n.to_string(),
        expected: "a non-negative day count",
      })?),
    };

    let challenge = Challenge {
      id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
      title: self.title,
      description: self.description,
      icon: self.icon,
      category: self.category,
      banner_image: self.banner_image,
      difficulty: self.difficulty.parse()?,
      priority: self.priority.parse()?,
      status: self.status.parse()?,
      tags: self.tags,
      excel_file: self.excel_file,
      start_date,
      total_days,
      completed_days,
    };
    challenge.validate()?;
    Ok(challenge)
  }
}

impl DashboardConfig {
  /// Converts every entry, logging and skipping the invalid ones.
  pub fn valid_challenges(&self) -> Vec<Challenge> {
    self
      .challenges
      .iter()
      .cloned()
      .enumerate()
      .filter_map(|(index, cc)| {
        let title = cc.title.clone();
        match cc.into_challenge() {
          Ok(c) => Some(c),
          Err(e) => {
            error!(target: "challenge", index, %title, error = %e, "Skipping invalid challenge entry");
            None
          }
        }
      })
      .collect()
  }
}

pub fn parse_config(text: &str) -> Result<DashboardConfig, toml::de::Error> {
  toml::from_str::<DashboardConfig>(text)
}

/// Attempt to load `DashboardConfig` from DASHBOARD_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_dashboard_config_from_env() -> Option<DashboardConfig> {
  let path = std::env::var("DASHBOARD_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_config(&s) {
      Ok(cfg) => {
        info!(target: "dashboard_backend", %path, entries = cfg.challenges.len(), "Loaded dashboard config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "dashboard_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "dashboard_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}
