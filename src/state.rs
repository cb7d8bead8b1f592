//! Application state: the immutable challenge snapshot, its id index, the table source
//! and the clock.
//!
//! The collection is loaded once at startup (TOML config or built-in seeds) and never
//! mutated afterwards, so handlers share it through an `Arc` without locking.

use std::{collections::HashMap, path::PathBuf, sync::Arc};

use chrono::{NaiveDate, NaiveDateTime, Utc};
use tracing::{error, info, instrument};

use crate::config::{load_dashboard_config_from_env, TablesCfg};
use crate::domain::{Challenge, Status};
use crate::error::{DashboardError, DashboardResult};
use crate::seeds::seed_challenges;
use crate::table::TableSource;

/// Source of "now". Injected so tests can pin the instant.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

/// The real clock: the current UTC wall-clock time.
pub fn system_now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

#[derive(Clone)]
pub struct AppState {
    pub challenges: Arc<Vec<Challenge>>,
    by_id: Arc<HashMap<String, usize>>,
    pub tables: TableSource,
    clock: Clock,
}

impl AppState {
    /// Build state from env: load config, fall back to seeds, build the id index.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg_opt = load_dashboard_config_from_env();

        let challenges = match &cfg_opt {
            Some(cfg) => cfg.valid_challenges(),
            None => {
                info!(target: "dashboard_backend", "No dashboard config; serving built-in seed challenges");
                seed_challenges()
            }
        };
        let tables = table_source_from_cfg(cfg_opt.as_ref().map(|c| &c.tables));

        Self::from_parts(challenges, tables, Arc::new(system_now))
    }

    /// Assemble state from already-loaded parts. Invalid entries and later duplicates of an id
    /// are dropped.
    pub fn from_parts(challenges: Vec<Challenge>, tables: TableSource, clock: Clock) -> Self {
        let mut by_id = HashMap::with_capacity(challenges.len());
        let mut kept = Vec::with_capacity(challenges.len());
        for c in challenges {
            if let Err(e) = c.validate() {
                error!(target: "challenge", id = %c.id, title = %c.title, error = %e, "Invalid challenge; skipping");
                continue;
            }
            if by_id.contains_key(&c.id) {
                error!(target: "challenge", id = %c.id, title = %c.title, "Duplicate challenge id; skipping");
                continue;
            }
            by_id.insert(c.id.clone(), kept.len());
            kept.push(c);
        }

        // Inventory summary by status.
        let mut count_by_status: HashMap<Status, usize> = HashMap::new();
        for c in &kept {
            *count_by_status.entry(c.status).or_insert(0) += 1;
        }
        for status in Status::ALL {
            let n = count_by_status.get(&status).copied().unwrap_or(0);
            info!(target: "challenge", %status, count = n, "Startup challenge inventory");
        }

        Self {
            challenges: Arc::new(kept),
            by_id: Arc::new(by_id),
            tables,
            clock,
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    pub fn today(&self) -> NaiveDate {
        self.now().date()
    }

    pub fn get_challenge(&self, id: &str) -> Option<&Challenge> {
        self.by_id.get(id).and_then(|&i| self.challenges.get(i))
    }

    pub fn require_challenge(&self, id: &str) -> DashboardResult<&Challenge> {
        self.get_challenge(id)
            .ok_or_else(|| DashboardError::UnknownChallenge(id.to_string()))
    }
}

/// Remote base URL wins over a local directory; the default directory is `./static`.
fn table_source_from_cfg(cfg: Option<&TablesCfg>) -> TableSource {
    let default_dir = || PathBuf::from(std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".into()));
    let Some(cfg) = cfg else {
        return TableSource::local(default_dir());
    };

    let source = match &cfg.base_url {
        Some(url) => match TableSource::remote(url) {
            Ok(src) => {
                info!(target: "dashboard_backend", base_url = %url, "Tables fetched over HTTP");
                src
            }
            Err(e) => {
                error!(target: "dashboard_backend", base_url = %url, error = %e, "HTTP client init failed; using local tables");
                TableSource::local(default_dir())
            }
        },
        None => TableSource::local(cfg.dir.as_ref().map(PathBuf::from).unwrap_or_else(default_dir)),
    };
    match cfg.fallback_days {
        Some(days) => source.with_fallback_days(days),
        None => source,
    }
}
