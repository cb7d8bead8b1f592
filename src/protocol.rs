//! Public protocol structs for the HTTP API (serde ready, camelCase on the wire).
//! Keep this small and stable to evolve backend and frontend independently.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::detail::{card_progress, ChallengeDetail};
use crate::domain::Challenge;
use crate::error::DashboardResult;
use crate::pipeline::{Choice, FilterState, SortKey, SortOrder};
use crate::table::{ExportFormat, Table};
use crate::temporal::days_remaining;

/// Query string of `GET /api/v1/challenges`. Absent parameters keep the default filter.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub difficulty: Option<String>,
    pub priority: Option<String>,
    /// Comma-separated.
    pub tags: Option<String>,
    pub search: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

impl ChallengeListQuery {
    pub fn into_filter(self) -> DashboardResult<FilterState> {
        let mut f = FilterState::default();
        if let Some(s) = self.status {
            f.status = s.parse()?;
        }
        if let Some(s) = self.category {
            f.category = if s == "all" { Choice::All } else { Choice::Only(s) };
        }
        if let Some(s) = self.difficulty {
            f.difficulty = s.parse()?;
        }
        if let Some(s) = self.priority {
            f.priority = s.parse()?;
        }
        if let Some(s) = self.tags {
            f.tags = s
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Some(s) = self.search {
            f.search = s;
        }
        if let Some(s) = self.sort_by {
            f.sort_by = s.parse::<SortKey>()?;
        }
        if let Some(s) = self.sort_order {
            f.sort_order = s.parse::<SortOrder>()?;
        }
        Ok(f)
    }
}

/// A challenge as shown on a card: the record plus values derived for `today`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeOut {
    #[serde(flatten)]
    pub challenge: Challenge,
    pub end_date: NaiveDate,
    pub days_remaining: i64,
    pub progress: Option<f64>,
}

pub fn to_out(c: &Challenge, today: NaiveDate) -> ChallengeOut {
    let end = c.end_date();
    ChallengeOut {
        challenge: c.clone(),
        end_date: end,
        days_remaining: days_remaining(end, today),
        progress: card_progress(c),
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeListOut {
    pub challenges: Vec<ChallengeOut>,
    pub total: usize,
    pub has_active_filters: bool,
    pub filter: FilterState,
}

#[derive(Debug, Serialize)]
pub struct ChallengeDetailOut {
    pub challenge: Challenge,
    pub detail: ChallengeDetail,
}

#[derive(Debug, Serialize)]
pub struct TableOut {
    pub rows: Table,
    pub fallback: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

impl ExportQuery {
    /// Defaults to the workbook format.
    pub fn format(&self) -> DashboardResult<ExportFormat> {
        match &self.format {
            Some(f) => f.parse(),
            None => Ok(ExportFormat::Xlsx),
        }
    }
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Status;

    #[test]
    fn empty_query_is_the_default_filter() {
        let f = ChallengeListQuery::default().into_filter().unwrap();
        assert_eq!(f, FilterState::default());
    }

    #[test]
    fn query_values_are_parsed_strictly() {
        let q = ChallengeListQuery {
            status: Some("completed".into()),
            category: Some("Fitness".into()),
            tags: Some(" cardio, ,morning ".into()),
            sort_by: Some("title".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        };
        let f = q.into_filter().unwrap();
        assert_eq!(f.status, Choice::Only(Status::Completed));
        assert_eq!(f.category, Choice::Only("Fitness".to_string()));
        assert_eq!(f.tags, ["cardio", "morning"]);
        assert_eq!(f.sort_by, SortKey::Title);

        let bad = ChallengeListQuery { sort_by: Some("color".into()), ..Default::default() };
        assert!(bad.into_filter().is_err());
    }

    #[test]
    fn card_output_flattens_the_record() {
        let mut c = Challenge::fixture("a", "Run", Status::Active, "2025-01-01", 10);
        c.completed_days = Some(5);
        let today = NaiveDate::from_ymd_opt(2025, 1, 12).unwrap();
        let json = serde_json::to_value(to_out(&c, today)).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["startDate"], "2025-01-01");
        assert_eq!(json["endDate"], "2025-01-10");
        assert_eq!(json["daysRemaining"], -2);
        assert_eq!(json["progress"], 50.0);
    }

    #[test]
    fn export_format_defaults_to_workbook() {
        assert_eq!(ExportQuery::default().format().unwrap(), ExportFormat::Xlsx);
        let csv = ExportQuery { format: Some("csv".into()) };
        assert_eq!(csv.format().unwrap(), ExportFormat::Csv);
    }
}
