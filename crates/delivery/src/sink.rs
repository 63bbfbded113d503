//! Output collaborators: where the filtered result table goes.

use crate::report::{build_report, PersistedReport};
use optflow_core::{Error, OptionGroupSummary, Result};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info};

/// Persists the filtered result table.
pub trait TableSink {
    /// Persist `summaries` under the file name `name`.
    fn persist(&self, name: &str, summaries: &[OptionGroupSummary]) -> Result<PersistedReport>;
}

impl<T: TableSink + ?Sized> TableSink for Box<T> {
    fn persist(&self, name: &str, summaries: &[OptionGroupSummary]) -> Result<PersistedReport> {
        (**self).persist(name, summaries)
    }
}

/// Writes the result CSV into a directory.
///
/// The file is written to a temporary name and renamed into place, so a
/// failed write never leaves a partial result behind.
#[derive(Debug, Clone)]
pub struct CsvFileSink {
    dir: PathBuf,
}

impl CsvFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl TableSink for CsvFileSink {
    fn persist(&self, name: &str, summaries: &[OptionGroupSummary]) -> Result<PersistedReport> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.dir.join(name);
        let tmp_path = self.dir.join(format!(".{name}.tmp"));
        let report = build_report(name, path.display().to_string(), summaries)?;

        std::fs::write(&tmp_path, &report.bytes)?;
        std::fs::rename(&tmp_path, &path)?;

        info!(path = %path.display(), rows = report.rows, "result file saved");
        Ok(report)
    }
}

/// Appends result rows to a SQLite table, one run id per persist.
#[derive(Debug, Clone)]
pub struct SqliteSink {
    path: PathBuf,
    run_id: String,
}

impl SqliteSink {
    pub fn new(path: impl Into<PathBuf>, run_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            run_id: run_id.into(),
        }
    }

    fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.path).map_err(db_err)?;
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS option_groups (
                run_id                 TEXT NOT NULL,
                file_name              TEXT NOT NULL,
                row_no                 INTEGER NOT NULL,
                symbol                 TEXT NOT NULL,
                underlying_price       REAL,
                option_type            TEXT NOT NULL,
                strike                 REAL,
                expiration_date        TEXT,
                total_volume           REAL NOT NULL,
                total_open_int         REAL NOT NULL,
                positive_delta_volume  REAL NOT NULL,
                negative_delta_volume  REAL NOT NULL,
                delta_volume_diff      REAL NOT NULL,
                days_to_expiration     INTEGER,
                strike_price_diff      REAL,
                strike_price_diff_pct  REAL,
                created_at             INTEGER DEFAULT (unixepoch()),
                PRIMARY KEY (run_id, row_no)
            );
            ",
        )
        .map_err(db_err)?;
        Ok(conn)
    }

    /// Load the rows stored for a run, in their original order.
    pub fn load_run(&self, run_id: &str) -> Result<Vec<OptionGroupSummary>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT symbol, underlying_price, option_type, strike, expiration_date,
                        total_volume, total_open_int, positive_delta_volume,
                        negative_delta_volume, delta_volume_diff, days_to_expiration,
                        strike_price_diff, strike_price_diff_pct
                 FROM option_groups WHERE run_id = ?1 ORDER BY row_no",
            )
            .map_err(db_err)?;

        let rows = stmt
            .query_map(params![run_id], |row| {
                let expiration: Option<String> = row.get(4)?;
                Ok(OptionGroupSummary {
                    symbol: row.get(0)?,
                    underlying_price: row.get(1)?,
                    option_type: row.get(2)?,
                    strike: row.get(3)?,
                    expiration_date: expiration.and_then(|d| d.parse().ok()),
                    total_volume: row.get(5)?,
                    total_open_interest: row.get(6)?,
                    positive_delta_volume: row.get(7)?,
                    negative_delta_volume: row.get(8)?,
                    delta_volume_diff: row.get(9)?,
                    days_to_expiration: row.get(10)?,
                    strike_price_diff: row.get(11)?,
                    strike_price_diff_pct: row.get(12)?,
                })
            })
            .map_err(db_err)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(db_err)?;

        Ok(rows)
    }
}

impl TableSink for SqliteSink {
    fn persist(&self, name: &str, summaries: &[OptionGroupSummary]) -> Result<PersistedReport> {
        let location = format!("{}?run_id={}", self.path.display(), self.run_id);
        let report = build_report(name, location, summaries)?;

        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(db_err)?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO option_groups (
                        run_id, file_name, row_no, symbol, underlying_price, option_type,
                        strike, expiration_date, total_volume, total_open_int,
                        positive_delta_volume, negative_delta_volume, delta_volume_diff,
                        days_to_expiration, strike_price_diff, strike_price_diff_pct
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
                )
                .map_err(db_err)?;

            for (row_no, s) in summaries.iter().enumerate() {
                stmt.execute(params![
                    self.run_id,
                    name,
                    row_no as i64,
                    s.symbol,
                    s.underlying_price,
                    s.option_type,
                    s.strike,
                    s.expiration_date.map(|d| d.to_string()),
                    s.total_volume,
                    s.total_open_interest,
                    s.positive_delta_volume,
                    s.negative_delta_volume,
                    s.delta_volume_diff,
                    s.days_to_expiration,
                    s.strike_price_diff,
                    s.strike_price_diff_pct,
                ])
                .map_err(db_err)?;
            }
        }
        tx.commit().map_err(db_err)?;

        debug!(run_id = %self.run_id, rows = report.rows, "result rows stored");
        Ok(report)
    }
}

/// Keeps persisted reports in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    reports: Mutex<Vec<PersistedReport>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every report persisted so far.
    pub fn reports(&self) -> Vec<PersistedReport> {
        self.reports.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl TableSink for MemorySink {
    fn persist(&self, name: &str, summaries: &[OptionGroupSummary]) -> Result<PersistedReport> {
        let report = build_report(name, format!("memory://{name}"), summaries)?;
        self.reports
            .lock()
            .map_err(|_| Error::sink("memory sink lock poisoned"))?
            .push(report.clone());
        Ok(report)
    }
}

fn db_err(e: rusqlite::Error) -> Error {
    Error::database(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::decode_csv;
    use chrono::NaiveDate;

    fn summary(symbol: &str, strike: Option<f64>) -> OptionGroupSummary {
        OptionGroupSummary {
            symbol: symbol.to_string(),
            underlying_price: Some(100.0),
            option_type: "Put".to_string(),
            strike,
            expiration_date: NaiveDate::from_ymd_opt(2024, 3, 15),
            total_volume: 1500.0,
            total_open_interest: 42.0,
            positive_delta_volume: 120.0,
            negative_delta_volume: 20.0,
            delta_volume_diff: 100.0,
            days_to_expiration: Some(74),
            strike_price_diff: strike.map(|k| k - 100.0),
            strike_price_diff_pct: strike.map(|k| k - 100.0),
        }
    }

    #[test]
    fn test_csv_file_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out_dir = dir.path().join("nested");
        let sink = CsvFileSink::new(&out_dir);

        let rows = vec![summary("SPY", Some(95.0)), summary("SPY", None)];
        let report = sink.persist("processed_options.csv", &rows).unwrap();

        let path = out_dir.join("processed_options.csv");
        assert_eq!(report.location, path.display().to_string());
        let written = std::fs::read(&path).unwrap();
        assert_eq!(written, report.bytes);
        assert_eq!(decode_csv(&written).unwrap(), rows);
        assert!(!out_dir.join(".processed_options.csv.tmp").exists());
    }

    #[test]
    fn test_sqlite_sink_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("results.db");

        let rows = vec![summary("QQQ", Some(101.5)), summary("QQQ", None)];
        let first = SqliteSink::new(&db, "run-1");
        let report = first.persist("processed_options.csv", &rows).unwrap();
        assert_eq!(report.rows, 2);
        assert!(report.location.ends_with("?run_id=run-1"));

        SqliteSink::new(&db, "run-2")
            .persist("processed_options.csv", &rows[..1])
            .unwrap();

        assert_eq!(first.load_run("run-1").unwrap(), rows);
        assert_eq!(first.load_run("run-2").unwrap().len(), 1);
        assert!(first.load_run("missing").unwrap().is_empty());
    }

    #[test]
    fn test_sqlite_sink_rejects_duplicate_run() {
        let dir = tempfile::tempdir().unwrap();
        let sink = SqliteSink::new(dir.path().join("results.db"), "run-1");
        let rows = vec![summary("QQQ", Some(101.5))];

        sink.persist("a.csv", &rows).unwrap();
        let err = sink.persist("a.csv", &rows).unwrap_err();
        assert!(matches!(err, Error::Database(_)));
        assert_eq!(sink.load_run("run-1").unwrap().len(), 1);
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.persist("x.csv", &[summary("IWM", None)]).unwrap();
        let reports = sink.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].location, "memory://x.csv");
    }
}
