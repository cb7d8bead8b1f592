//! HTTP endpoint handlers. These are thin wrappers that read the clock once, call the pure
//! core and serialize the result. Each handler is instrumented and logs basic result info.

use std::sync::Arc;

use axum::{
  extract::{Path, Query, State},
  http::header,
  response::IntoResponse,
  Json,
};
use tracing::{debug, info, instrument};

use crate::analytics::{build_report, AnalyticsReport};
use crate::detail::ChallengeDetail;
use crate::error::DashboardResult;
use crate::pipeline::{apply_filter_and_sort, filter_options, FilterOptions};
use crate::protocol::*;
use crate::state::AppState;
use crate::stats::{compute_statistics, Statistics};
use crate::table::{export_filename, export_table};
use crate::util::trunc_for_log;

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state, q))]
pub async fn http_list_challenges(
  State(state): State<Arc<AppState>>,
  Query(q): Query<ChallengeListQuery>,
) -> DashboardResult<Json<ChallengeListOut>> {
  let filter = q.into_filter()?;
  let today = state.today();
  let matched = apply_filter_and_sort(&state.challenges, &filter);
  debug!(
    target: "challenge",
    search = %trunc_for_log(&filter.search, 64),
    sort_by = ?filter.sort_by,
    sort_order = ?filter.sort_order,
    matched = matched.len(),
    "Challenge list filtered"
  );
  Ok(Json(ChallengeListOut {
    total: matched.len(),
    has_active_filters: filter.has_active_filters(),
    challenges: matched.iter().map(|c| to_out(c, today)).collect(),
    filter,
  }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenge(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> DashboardResult<Json<ChallengeDetailOut>> {
  let c = state.require_challenge(&id)?;
  let detail = ChallengeDetail::derive(c, state.now());
  info!(target: "challenge", %id, days_remaining = detail.days_remaining, "HTTP challenge detail served");
  Ok(Json(ChallengeDetailOut { challenge: c.clone(), detail }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_table(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> DashboardResult<Json<TableOut>> {
  let c = state.require_challenge(&id)?;
  let loaded = state.tables.load_or_placeholder(&c.excel_file, state.today()).await;
  info!(target: "challenge", %id, rows = loaded.table.rows.len(), fallback = loaded.fallback, "HTTP table served");
  Ok(Json(TableOut { rows: loaded.table, fallback: loaded.fallback }))
}

#[instrument(level = "info", skip(state, q))]
pub async fn http_export_table(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  Query(q): Query<ExportQuery>,
) -> DashboardResult<impl IntoResponse> {
  let format = q.format()?;
  let c = state.require_challenge(&id)?;
  let loaded = state.tables.load_or_placeholder(&c.excel_file, state.today()).await;
  let bytes = export_table(&loaded.table, format)?;
  let filename = export_filename(&c.title, format);
  info!(target: "challenge", %id, %filename, bytes = bytes.len(), fallback = loaded.fallback, "HTTP table exported");
  Ok((
    [
      (header::CONTENT_TYPE, format.content_type().to_string()),
      (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ],
    bytes,
  ))
}

#[instrument(level = "info", skip(state))]
pub async fn http_statistics(State(state): State<Arc<AppState>>) -> Json<Statistics> {
  Json(compute_statistics(&state.challenges))
}

#[instrument(level = "info", skip(state))]
pub async fn http_analytics(State(state): State<Arc<AppState>>) -> Json<AnalyticsReport> {
  Json(build_report(&state.challenges, state.today()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_filter_options(State(state): State<Arc<AppState>>) -> Json<FilterOptions> {
  Json(filter_options(&state.challenges))
}
