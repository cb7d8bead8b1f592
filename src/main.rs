//! Challenge Dashboard Backend
//!
//! - Axum HTTP API over a static challenge collection: filtered/sorted lists, statistics,
//!   analytics, per-challenge detail and day-by-day progress tables (JSON, CSV, XLSX)
//! - Static SPA fallback (STATIC_DIR/index.html)
//!
//! Important env variables:
//!   PORT                  : u16 (default 3000)
//!   DASHBOARD_CONFIG_PATH : path to TOML config (challenge collection + table settings)
//!   STATIC_DIR            : SPA assets and default table directory (default "./static")
//!   LOG_LEVEL             : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT            : "pretty" (default) or "json"

mod analytics;
mod config;
mod detail;
mod domain;
mod error;
mod pipeline;
mod protocol;
mod routes;
mod seeds;
mod state;
mod stats;
mod table;
mod telemetry;
mod temporal;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Immutable challenge snapshot, id index, table source, clock.
  let state = Arc::new(AppState::new());

  let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into());
  let app = build_router(state, &static_dir);

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "dashboard_backend", %addr, %static_dir, "HTTP server listening");
  axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
  info!(target: "dashboard_backend", "HTTP server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "dashboard_backend", error = %e, "Failed to listen for Ctrl-C; running until killed");
    std::future::pending::<()>().await;
  }
}
