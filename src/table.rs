//! Per-challenge progress tables: loading, placeholder fallback and export.
//!
//! A challenge's `excel_file` is resolved either against a local directory or a remote
//! base URL. `.csv`/`.txt` files are decoded as comma-delimited text, anything else as a
//! workbook (first sheet). When loading fails the caller gets a generated placeholder
//! table instead of an error, flagged as a fallback.

use std::{fmt, io::Cursor, path::PathBuf, str::FromStr, time::Duration};

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use chrono::{Duration as ChronoDuration, NaiveDate};
use reqwest::header::USER_AGENT;
use rust_xlsxwriter::Workbook;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{DashboardError, DashboardResult};

pub const SHEET_NAME: &str = "Challenge Data";
pub const DEFAULT_FALLBACK_DAYS: u32 = 30;
pub const MAX_FALLBACK_DAYS: u32 = 366;
const PLACEHOLDER_DONE_DAYS: u32 = 3;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Interprets a raw delimited-text field: blank → empty, numeric → number.
    fn infer(raw: &str) -> Cell {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Empty
        } else if let Some(n) = trimmed.parse::<f64>().ok().filter(|n| n.is_finite()) {
            Cell::Number(n)
        } else {
            Cell::Text(raw.to_string())
        }
    }

    fn from_workbook(data: &Data) -> Cell {
        match data {
            Data::Empty => Cell::Empty,
            Data::Int(i) => Cell::Number(*i as f64),
            Data::Float(f) => Cell::Number(*f),
            Data::String(s) if s.is_empty() => Cell::Empty,
            Data::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.0}", n),
            Cell::Number(n) => write!(f, "{}", n),
            Cell::Text(s) => f.write_str(s),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() { Cell::Empty } else { Cell::Text(s.to_string()) }
    }
}

/// Header row first, then one row per day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Vec<Cell>>,
}

/// Generated stand-in used when the real table cannot be loaded: the first three days
/// are marked done, the rest pending.
pub fn placeholder_table(start: NaiveDate, total_days: u32) -> Table {
    let mut rows = Vec::with_capacity(total_days as usize + 1);
    rows.push(["Day", "Date", "Completed", "Notes", "Status"].map(Cell::from).to_vec());
    for i in 0..total_days {
        let date = start + ChronoDuration::days(i64::from(i));
        let done = i < PLACEHOLDER_DONE_DAYS;
        rows.push(vec![
            Cell::Number(f64::from(i + 1)),
            Cell::Text(date.format("%Y-%m-%d").to_string()),
            Cell::from(if done { "✅" } else { "" }),
            Cell::from(if done { "Completed successfully" } else { "" }),
            Cell::from(if done { "✅" } else { "⏳" }),
        ]);
    }
    Table { rows }
}

/// Comma-delimited rows, no header handling: the header is just the first row.
/// Rows may differ in length; blank lines are skipped.
pub fn parse_delimited_text(bytes: &[u8]) -> Result<Table, String> {
    let bytes = bytes.strip_prefix(b"\xef\xbb\xbf").unwrap_or(bytes);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let rows = reader
        .records()
        .map(|record| {
            record
                .map(|r| r.iter().map(Cell::infer).collect())
                .map_err(|e| e.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Table { rows })
}

/// Reads the first sheet of a workbook (xlsx, xls, ods) held in memory.
pub fn parse_workbook(bytes: Vec<u8>) -> Result<Table, String> {
    let mut sheets = open_workbook_auto_from_rs(Cursor::new(bytes)).map_err(|e| e.to_string())?;
    let range = sheets
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no sheets".to_string())?
        .map_err(|e| e.to_string())?;
    let rows = range.rows().map(|r| r.iter().map(Cell::from_workbook).collect()).collect();
    Ok(Table { rows })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            other => Err(DashboardError::InvalidValue {
                field: "format",
                value: other.to_string(),
                expected: "csv xlsx",
            }),
        }
    }
}

/// Comma-separated rows, one per line; fields are quoted only when they need it.
pub fn to_delimited_text(table: &Table) -> DashboardResult<Vec<u8>> {
    let export_err = |e: csv::Error| DashboardError::Export(e.to_string());
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    for row in &table.rows {
        writer.write_record(row.iter().map(Cell::to_string)).map_err(export_err)?;
    }
    writer.into_inner().map_err(|e| DashboardError::Export(e.to_string()))
}

/// Single-sheet xlsx workbook; numbers are written as numeric cells.
pub fn to_workbook(table: &Table) -> DashboardResult<Vec<u8>> {
    let export_err = |e: rust_xlsxwriter::XlsxError| DashboardError::Export(e.to_string());
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME).map_err(export_err)?;

    for (r, row) in table.rows.iter().enumerate() {
        let r = u32::try_from(r).map_err(|_| DashboardError::Export("too many rows".into()))?;
        for (c, cell) in row.iter().enumerate() {
            let c = u16::try_from(c).map_err(|_| DashboardError::Export("too many columns".into()))?;
            match cell {
                Cell::Number(n) => {
                    sheet.write_number(r, c, *n).map_err(export_err)?;
                }
                Cell::Text(s) => {
                    sheet.write_string(r, c, s).map_err(export_err)?;
                }
                Cell::Empty => {}
            }
        }
    }
    workbook.save_to_buffer().map_err(export_err)
}

pub fn export_table(table: &Table, format: ExportFormat) -> DashboardResult<Vec<u8>> {
    match format {
        ExportFormat::Csv => to_delimited_text(table),
        ExportFormat::Xlsx => to_workbook(table),
    }
}

/// `"{title}-data.{ext}"`, restricted to characters safe in a `Content-Disposition` header.
pub fn export_filename(title: &str, format: ExportFormat) -> String {
    let safe: String = title
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || matches!(ch, ' ' | '-' | '_' | '.') { ch } else { '_' })
        .collect();
    format!("{}-data.{}", safe.trim(), format.extension())
}

#[derive(Clone, Debug)]
pub enum TableLocation {
    Dir(PathBuf),
    Remote { base_url: String, client: reqwest::Client },
}

/// Resolves `excel_file` references to tables.
#[derive(Clone, Debug)]
pub struct TableSource {
    pub location: TableLocation,
    pub fallback_days: u32,
}

/// A loaded table and whether it is the generated placeholder.
#[derive(Clone, Debug, PartialEq)]
pub struct LoadedTable {
    pub table: Table,
    pub fallback: bool,
}

impl TableSource {
    pub fn local(dir: impl Into<PathBuf>) -> Self {
        Self { location: TableLocation::Dir(dir.into()), fallback_days: DEFAULT_FALLBACK_DAYS }
    }

    pub fn remote(base_url: &str) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| e.to_string())?;
        Ok(Self {
            location: TableLocation::Remote {
                base_url: base_url.trim_end_matches('/').to_string(),
                client,
            },
            fallback_days: DEFAULT_FALLBACK_DAYS,
        })
    }

    /// Clamped to `1..=MAX_FALLBACK_DAYS`.
    pub fn with_fallback_days(mut self, days: u32) -> Self {
        self.fallback_days = days.clamp(1, MAX_FALLBACK_DAYS);
        self
    }

    #[instrument(level = "debug", skip(self))]
    pub async fn load(&self, file_ref: &str) -> DashboardResult<Table> {
        let fail = |reason: String| DashboardError::TableLoad { file_ref: file_ref.to_string(), reason };
        check_file_ref(file_ref).map_err(fail)?;

        let bytes = match &self.location {
            TableLocation::Dir(dir) => {
                tokio::fs::read(dir.join(file_ref)).await.map_err(|e| fail(e.to_string()))?
            }
            TableLocation::Remote { base_url, client } => {
                let url = format!("{}/{}", base_url, file_ref);
                let res = client
                    .get(&url)
                    .header(USER_AGENT, "challenge-dashboard-backend/0.1")
                    .send()
                    .await
                    .map_err(|e| fail(e.to_string()))?;
                if !res.status().is_success() {
                    return Err(fail(format!("HTTP {}", res.status())));
                }
                res.bytes().await.map_err(|e| fail(e.to_string()))?.to_vec()
            }
        };
        debug!(target: "dashboard_backend", %file_ref, bytes = bytes.len(), "table bytes fetched");

        if is_delimited_text(file_ref) {
            parse_delimited_text(&bytes).map_err(fail)
        } else {
            parse_workbook(bytes).map_err(fail)
        }
    }

    /// Never fails: substitutes `placeholder_table(today, fallback_days)` on any load error.
    pub async fn load_or_placeholder(&self, file_ref: &str, today: NaiveDate) -> LoadedTable {
        match self.load(file_ref).await {
            Ok(table) => LoadedTable { table, fallback: false },
            Err(e) => {
                warn!(target: "challenge", %file_ref, error = %e, "table unavailable; serving placeholder");
                LoadedTable { table: placeholder_table(today, self.fallback_days), fallback: true }
            }
        }
    }
}

fn is_delimited_text(file_ref: &str) -> bool {
    let lower = file_ref.to_ascii_lowercase();
    lower.ends_with(".csv") || lower.ends_with(".txt")
}

/// File refs are relative names inside the table location; no escaping it.
fn check_file_ref(file_ref: &str) -> Result<(), String> {
    if file_ref.trim().is_empty() {
        return Err("empty file reference".into());
    }
    if file_ref.starts_with('/') || file_ref.contains('\\') || file_ref.split('/').any(|p| p == "..") {
        return Err("file reference must be a relative path inside the table directory".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("dashboard-table-{}-{}", name, uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn placeholder_marks_first_three_days_done() {
        let t = placeholder_table(d(2025, 1, 30), 5);
        assert_eq!(t.rows.len(), 6);
        assert_eq!(t.rows[0][0], Cell::Text("Day".into()));
        assert_eq!(t.rows[1], vec![
            Cell::Number(1.0),
            Cell::Text("2025-01-30".into()),
            Cell::Text("✅".into()),
            Cell::Text("Completed successfully".into()),
            Cell::Text("✅".into()),
        ]);
        assert_eq!(t.rows[3][1], Cell::Text("2025-02-01".into()));
        assert_eq!(t.rows[4], vec![
            Cell::Number(4.0),
            Cell::Text("2025-02-02".into()),
            Cell::Empty,
            Cell::Empty,
            Cell::Text("⏳".into()),
        ]);
    }

    #[test]
    fn delimited_text_handles_quotes_and_crlf() {
        let t = parse_delimited_text(b"Day,Notes\r\n1,\"ran 5k, felt \"\"great\"\"\"\r\n2,\r\n").unwrap();
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[1][0], Cell::Number(1.0));
        assert_eq!(t.rows[1][1], Cell::Text("ran 5k, felt \"great\"".into()));
        assert_eq!(t.rows[2], vec![Cell::Number(2.0), Cell::Empty]);
    }

    #[test]
    fn ragged_rows_and_bom_are_accepted() {
        let t = parse_delimited_text("\u{feff}Day,Date,Notes\n1,2025-01-01\n\n2,2025-01-02,late\n".as_bytes()).unwrap();
        assert_eq!(t.rows.len(), 3);
        assert_eq!(t.rows[0][0], Cell::Text("Day".into()));
        assert_eq!(t.rows[1].len(), 2);
        assert_eq!(t.rows[2][2], Cell::Text("late".into()));
    }

    #[test]
    fn invalid_utf8_is_a_load_error() {
        assert!(parse_delimited_text(b"Day\n\xff\xfe\n").is_err());
    }

    #[test]
    fn delimited_export_quotes_only_when_needed() {
        let table = Table {
            rows: vec![
                vec![Cell::from("Day"), Cell::from("Notes")],
                vec![Cell::Number(1.0), Cell::from("easy, fast")],
                vec![Cell::Number(2.5), Cell::from("said \"ok\"")],
                vec![Cell::Number(3.0), Cell::Empty],
            ],
        };
        let bytes = to_delimited_text(&table).unwrap();
        assert_eq!(
            String::from_utf8(bytes.clone()).unwrap(),
            "Day,Notes\n1,\"easy, fast\"\n2.5,\"said \"\"ok\"\"\"\n3,\n"
        );
        assert_eq!(parse_delimited_text(&bytes).unwrap(), table);
    }

    #[test]
    fn workbook_export_produces_a_zip_container() {
        let bytes = to_workbook(&placeholder_table(d(2025, 1, 1), 3)).unwrap();
        assert!(bytes.starts_with(b"PK"));
        let back = parse_workbook(bytes).unwrap();
        assert_eq!(back.rows[0][4], Cell::Text("Status".into()));
        assert_eq!(back.rows[2][0], Cell::Number(2.0));
    }

    #[test]
    fn export_names_are_header_safe() {
        assert_eq!(export_filename("30 Days of Code", ExportFormat::Csv), "30 Days of Code-data.csv");
        assert_eq!(export_filename("Run \"fast\"/5k", ExportFormat::Xlsx), "Run _fast__5k-data.xlsx");
        assert!("pdf".parse::<ExportFormat>().is_err());
    }

    #[test]
    fn file_refs_cannot_escape_the_directory() {
        assert!(check_file_ref("run.csv").is_ok());
        assert!(check_file_ref("tables/run.xlsx").is_ok());
        assert!(check_file_ref("../secret.csv").is_err());
        assert!(check_file_ref("/etc/passwd").is_err());
        assert!(check_file_ref("  ").is_err());
    }

    #[tokio::test]
    async fn loads_delimited_file_from_directory() {
        let dir = scratch_dir("load");
        std::fs::write(dir.join("run.csv"), "Day,Date\n1,2025-01-01\n").unwrap();
        let source = TableSource::local(&dir);

        let loaded = source.load_or_placeholder("run.csv", d(2025, 3, 1)).await;
        assert!(!loaded.fallback);
        assert_eq!(loaded.table.rows[1], vec![Cell::Number(1.0), Cell::Text("2025-01-01".into())]);
        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn missing_or_corrupt_tables_fall_back_to_placeholder() {
        let dir = scratch_dir("fallback");
        std::fs::write(dir.join("broken.xlsx"), b"not a workbook").unwrap();
        let source = TableSource::local(&dir).with_fallback_days(4);

        assert!(matches!(source.load("missing.csv").await, Err(DashboardError::TableLoad { .. })));
        let loaded = source.load_or_placeholder("broken.xlsx", d(2025, 3, 1)).await;
        assert!(loaded.fallback);
        assert_eq!(loaded.table, placeholder_table(d(2025, 3, 1), 4));
        assert_eq!(
            TableSource::local(&dir).with_fallback_days(u32::MAX).fallback_days,
            MAX_FALLBACK_DAYS
        );
        std::fs::remove_dir_all(dir).ok();
    }
}
