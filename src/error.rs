//! Error type shared by the core, the table collaborator and the HTTP layer.
//!
//! The core functions are total over well-formed input; everything that is not
//! well-formed (unknown enum strings, non-positive durations, bad dates) is rejected
//! with a descriptive `DashboardError` instead of being coerced.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::error;

use crate::protocol::ErrorOut;

pub type DashboardResult<T> = Result<T, DashboardError>;

#[derive(Debug, Error)]
pub enum DashboardError {
  #[error("invalid {field}: {value:?} (expected one of: {expected})")]
  InvalidValue { field: &'static str, value: String, expected: &'static str },

  #[error("totalDays must be at least 1, got {0}")]
  NonPositiveDuration(i64),

  #[error("totalDays {total_days} starting {start} runs past the last representable date")]
  DurationOutOfRange { start: String, total_days: i64 },

  #[error("invalid date {value:?}: {reason}")]
  InvalidDate { value: String, reason: String },

  #[error("unknown challenge id: {0}")]
  UnknownChallenge(String),

  #[error("failed to load table {file_ref:?}: {reason}")]
  TableLoad { file_ref: String, reason: String },

  #[error("failed to export table: {0}")]
  Export(String),
}

impl DashboardError {
  pub fn status_code(&self) -> StatusCode {
    match self {
      DashboardError::InvalidValue { .. }
      | DashboardError::NonPositiveDuration(_)
      | DashboardError::DurationOutOfRange { .. }
      | DashboardError::InvalidDate { .. } => StatusCode::BAD_REQUEST,
      DashboardError::UnknownChallenge(_) => StatusCode::NOT_FOUND,
      DashboardError::TableLoad { .. } => StatusCode::BAD_GATEWAY,
      DashboardError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }
}

impl IntoResponse for DashboardError {
  fn into_response(self) -> Response {
    let status = self.status_code();
    if status.is_server_error() {
      error!(target: "dashboard_backend", error = %self, "request failed");
    }
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}
