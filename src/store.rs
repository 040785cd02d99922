use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS data (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day INTEGER NOT NULL,
    hour INTEGER NOT NULL,
    minute INTEGER NOT NULL,
    second INTEGER NOT NULL,
    tick INTEGER NOT NULL,
    duration INTEGER NOT NULL,
    server_timestamp TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS status (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    year INTEGER NOT NULL,
    month INTEGER NOT NULL,
    day INTEGER NOT NULL,
    hour INTEGER NOT NULL,
    minute INTEGER NOT NULL,
    second INTEGER NOT NULL,
    solar_panel_voltage REAL NOT NULL,
    solar_panel_boosted_voltage REAL NOT NULL,
    battery_voltage REAL NOT NULL,
    server_timestamp TEXT NOT NULL
);
"#;

/// One tick/duration measurement event. `id` is store-assigned and strictly
/// increasing in insertion order; it is the only ordering key. The six time
/// components are sensor-reported wall clock, stored verbatim.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct SampleRecord {
    pub id: i64,
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub tick: i64,
    pub duration: i64,
    pub server_timestamp: String,
}

/// One power-supply voltage snapshot. Same ordering and lifecycle rules as
/// [`SampleRecord`]; correlated with it by insertion order, not by key.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct StatusRecord {
    pub id: i64,
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub solar_panel_voltage: f64,
    pub solar_panel_boosted_voltage: f64,
    pub battery_voltage: f64,
    pub server_timestamp: String,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct SamplePayload {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    pub ticks: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
pub struct StatusPayload {
    pub solar_panel_voltage: f64,
    pub solar_panel_boosted_voltage: f64,
    pub battery_voltage: f64,
}

/// Append-only event store over a local SQLite file. The handle is cheap to
/// clone; every call opens its own connection and releases it on return.
#[derive(Clone)]
pub struct Store {
    db_path: PathBuf,
}

impl Store {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    /// Idempotent schema creation; must run once before the listener binds.
    pub fn init_schema(&self) -> Result<()> {
        if let Some(parent) = self.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("failed to create database directory {}", parent.display())
                })?;
            }
        }
        let mut conn = open_connection(&self.db_path)?;
        if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
            tracing::warn!(error = %err, "failed to enable WAL journal mode");
        }
        let tx = conn
            .transaction()
            .context("failed to open schema transaction")?;
        tx.execute_batch(SCHEMA)
            .context("failed to create telemetry tables")?;
        tx.commit().context("failed to commit schema")?;
        Ok(())
    }

    /// Appends one sample row and one status row as a single transaction.
    /// Both rows share `server_timestamp` and the sensor-reported time
    /// components; a failure leaves neither row behind.
    pub async fn insert_report(
        &self,
        sample: SamplePayload,
        status: StatusPayload,
        server_timestamp: String,
    ) -> Result<()> {
        self.with_conn(move |conn| {
            let tx = conn
                .transaction()
                .context("failed to open insert transaction")?;
            tx.execute(
                "INSERT INTO data (year, month, day, hour, minute, second, tick, duration, server_timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    sample.year,
                    sample.month,
                    sample.day,
                    sample.hour,
                    sample.minute,
                    sample.second,
                    sample.ticks,
                    sample.duration,
                    server_timestamp,
                ],
            )
            .context("failed to insert sample row")?;
            tx.execute(
                "INSERT INTO status (year, month, day, hour, minute, second, solar_panel_voltage, solar_panel_boosted_voltage, battery_voltage, server_timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    sample.year,
                    sample.month,
                    sample.day,
                    sample.hour,
                    sample.minute,
                    sample.second,
                    status.solar_panel_voltage,
                    status.solar_panel_boosted_voltage,
                    status.battery_voltage,
                    server_timestamp,
                ],
            )
            .context("failed to insert status row")?;
            tx.commit().context("failed to commit report")?;
            Ok(())
        })
        .await
    }

    pub async fn all_samples(&self) -> Result<Vec<SampleRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, year, month, day, hour, minute, second, tick, duration, server_timestamp
                 FROM data ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], sample_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn all_status(&self) -> Result<Vec<StatusRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, year, month, day, hour, minute, second, solar_panel_voltage, solar_panel_boosted_voltage, battery_voltage, server_timestamp
                 FROM status ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map([], status_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn samples_by_hour(&self, hour: i64) -> Result<Vec<SampleRecord>> {
        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, year, month, day, hour, minute, second, tick, duration, server_timestamp
                 FROM data WHERE hour = ?1 ORDER BY id ASC",
            )?;
            let rows = stmt
                .query_map(params![hour], sample_from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })
        .await
    }

    pub async fn latest_sample(&self) -> Result<Option<SampleRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, year, month, day, hour, minute, second, tick, duration, server_timestamp
                 FROM data ORDER BY id DESC LIMIT 1",
            )?;
            let row = stmt.query_row([], sample_from_row).optional()?;
            Ok(row)
        })
        .await
    }

    pub async fn latest_status(&self) -> Result<Option<StatusRecord>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, year, month, day, hour, minute, second, solar_panel_voltage, solar_panel_boosted_voltage, battery_voltage, server_timestamp
                 FROM status ORDER BY id DESC LIMIT 1",
            )?;
            let row = stmt.query_row([], status_from_row).optional()?;
            Ok(row)
        })
        .await
    }

    async fn with_conn<T, F>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let path = self.db_path.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = open_connection(&path)?;
            task(&mut conn)
        })
        .await
        .context("database task panicked")?
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("failed to open SQLite database at {}", path.display()))?;
    conn.busy_timeout(Duration::from_secs(5))
        .context("failed to set busy timeout")?;
    Ok(conn)
}

fn sample_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SampleRecord> {
    Ok(SampleRecord {
        id: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        day: row.get(3)?,
        hour: row.get(4)?,
        minute: row.get(5)?,
        second: row.get(6)?,
        tick: row.get(7)?,
        duration: row.get(8)?,
        server_timestamp: row.get(9)?,
    })
}

fn status_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StatusRecord> {
    Ok(StatusRecord {
        id: row.get(0)?,
        year: row.get(1)?,
        month: row.get(2)?,
        day: row.get(3)?,
        hour: row.get(4)?,
        minute: row.get(5)?,
        second: row.get(6)?,
        solar_panel_voltage: row.get(7)?,
        solar_panel_boosted_voltage: row.get(8)?,
        battery_voltage: row.get(9)?,
        server_timestamp: row.get(10)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_store(dir: &TempDir) -> Store {
        let store = Store::new(dir.path().join("nested/geiger.db"));
        store.init_schema().expect("init schema");
        store
    }

    fn sample_payload(hour: i64, ticks: i64) -> SamplePayload {
        SamplePayload {
            year: 2024,
            month: 6,
            day: 1,
            hour,
            minute: 0,
            second: 0,
            ticks,
            duration: 60,
        }
    }

    fn status_payload(battery: f64) -> StatusPayload {
        StatusPayload {
            solar_panel_voltage: 5.1,
            solar_panel_boosted_voltage: 5.3,
            battery_voltage: battery,
        }
    }

    #[test]
    fn init_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);
        store.init_schema().expect("second init");
    }

    #[tokio::test]
    async fn empty_store_has_no_rows() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        assert!(store.all_samples().await.unwrap().is_empty());
        assert!(store.all_status().await.unwrap().is_empty());
        assert!(store.latest_sample().await.unwrap().is_none());
        assert!(store.latest_status().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_report_appends_one_row_per_stream() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        store
            .insert_report(
                sample_payload(12, 42),
                status_payload(4.0),
                "2024-06-01T12:00:05+09:00".to_string(),
            )
            .await
            .unwrap();

        let samples = store.all_samples().await.unwrap();
        let statuses = store.all_status().await.unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(statuses.len(), 1);

        let sample = &samples[0];
        assert_eq!(sample.id, 1);
        assert_eq!(sample.tick, 42);
        assert_eq!(sample.duration, 60);
        assert_eq!(sample.server_timestamp, "2024-06-01T12:00:05+09:00");

        let status = &statuses[0];
        assert_eq!(status.battery_voltage, 4.0);
        assert_eq!(status.server_timestamp, sample.server_timestamp);
    }

    #[tokio::test]
    async fn ids_increase_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        for ticks in [1, 2, 3] {
            store
                .insert_report(
                    sample_payload(12, ticks),
                    status_payload(4.0),
                    format!("2024-06-01T12:00:0{ticks}+09:00"),
                )
                .await
                .unwrap();
        }

        let samples = store.all_samples().await.unwrap();
        let ids: Vec<i64> = samples.iter().map(|record| record.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);

        let latest = store.latest_sample().await.unwrap().unwrap();
        assert_eq!(latest.id, 3);
        assert_eq!(latest.tick, 3);
        let latest_status = store.latest_status().await.unwrap().unwrap();
        assert_eq!(latest_status.id, 3);
    }

    #[tokio::test]
    async fn samples_by_hour_filters_exactly_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir);

        for (hour, ticks) in [(12, 10), (3, 20), (12, 30)] {
            store
                .insert_report(
                    sample_payload(hour, ticks),
                    status_payload(4.0),
                    "2024-06-01T12:00:00+09:00".to_string(),
                )
                .await
                .unwrap();
        }

        let noon = store.samples_by_hour(12).await.unwrap();
        let ticks: Vec<i64> = noon.iter().map(|record| record.tick).collect();
        assert_eq!(ticks, vec![10, 30]);

        assert!(store.samples_by_hour(7).await.unwrap().is_empty());
    }
}
