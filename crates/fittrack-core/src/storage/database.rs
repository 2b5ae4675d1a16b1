//! SQLite-based persistence.
//!
//! Provides durable storage for:
//! - Daily step counters (kv table, keys scoped by local date)
//! - Completed workouts and their statistics
//! - Key-value store for application state (e.g. the CLI's timer
//!   registry snapshot)

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, DatabaseError};

use super::data_dir;

/// One completed workout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecord {
    pub id: i64,
    pub workout_id: i64,
    pub duration_min: u64,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct WorkoutStats {
    pub total_workouts: u64,
    pub total_minutes: u64,
    pub today_workouts: u64,
    pub today_minutes: u64,
}

/// SQLite database for counters and the workout log.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/fittrack/fittrack.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("fittrack.db");
        Self::open_at(&path)
    }

    /// Open a database at an explicit path (used by tests over tempdirs).
    pub fn open_at(path: &Path) -> Result<Self, CoreError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, CoreError> {
        let conn = Connection::open_in_memory().map_err(DatabaseError::from)?;
        let db = Self { conn };
        db.migrate()
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS workouts (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                workout_id   INTEGER NOT NULL,
                duration_min INTEGER NOT NULL,
                completed_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_workouts_completed_at ON workouts(completed_at);",
        )?;
        Ok(())
    }

    // ── Key-value store ──────────────────────────────────────────────

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<String>, rusqlite::Error> {
        let mut stmt = self.conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
        let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &str) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // ── Step counters ────────────────────────────────────────────────
    //
    // Counters are kv rows keyed by local date: `steps_<date>` holds the
    // accepted total, `initial_count_<date>` the lifetime-counter
    // baseline, `last_date` the date counters were last initialized for.
    // Historical dates are kept indefinitely.

    pub fn daily_steps(&self, date: NaiveDate) -> Result<u64, rusqlite::Error> {
        Ok(self
            .kv_get(&format!("steps_{date}"))?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub fn set_daily_steps(&self, date: NaiveDate, steps: u64) -> Result<(), rusqlite::Error> {
        self.kv_set(&format!("steps_{date}"), &steps.to_string())
    }

    pub fn initial_count(&self, date: NaiveDate) -> Result<Option<i64>, rusqlite::Error> {
        Ok(self
            .kv_get(&format!("initial_count_{date}"))?
            .and_then(|v| v.parse().ok()))
    }

    pub fn set_initial_count(&self, date: NaiveDate, value: i64) -> Result<(), rusqlite::Error> {
        self.kv_set(&format!("initial_count_{date}"), &value.to_string())
    }

    pub fn last_date(&self) -> Result<Option<NaiveDate>, rusqlite::Error> {
        Ok(self
            .kv_get("last_date")?
            .and_then(|v| v.parse().ok()))
    }

    pub fn set_last_date(&self, date: NaiveDate) -> Result<(), rusqlite::Error> {
        self.kv_set("last_date", &date.to_string())
    }

    /// Most recent daily step totals, newest first.
    pub fn step_history(&self, limit: usize) -> Result<Vec<(NaiveDate, u64)>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT key, value FROM kv WHERE key LIKE 'steps_%' ORDER BY key DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut history = Vec::new();
        for row in rows {
            let (key, value) = row?;
            let date = key.trim_start_matches("steps_").parse::<NaiveDate>();
            if let (Ok(date), Ok(steps)) = (date, value.parse::<u64>()) {
                history.push((date, steps));
            }
        }
        Ok(history)
    }

    // ── Workout log ──────────────────────────────────────────────────

    /// Record a completed workout.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_workout(
        &self,
        workout_id: i64,
        duration_min: u64,
        completed_at: DateTime<Utc>,
    ) -> Result<i64, rusqlite::Error> {
        self.conn.execute(
            "INSERT INTO workouts (workout_id, duration_min, completed_at)
             VALUES (?1, ?2, ?3)",
            params![workout_id, duration_min, completed_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Most recently completed workouts, newest first.
    pub fn recent_workouts(&self, limit: usize) -> Result<Vec<WorkoutRecord>, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT id, workout_id, duration_min, completed_at
             FROM workouts ORDER BY completed_at DESC LIMIT ?1",
        )?;
        let rows = stmt.query_map(params![limit as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, i64>(1)?,
                row.get::<_, u64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut records = Vec::new();
        for row in rows {
            let (id, workout_id, duration_min, completed_at) = row?;
            if let Ok(completed_at) = DateTime::parse_from_rfc3339(&completed_at) {
                records.push(WorkoutRecord {
                    id,
                    workout_id,
                    duration_min,
                    completed_at: completed_at.with_timezone(&Utc),
                });
            }
        }
        Ok(records)
    }

    pub fn stats_today(&self) -> Result<WorkoutStats, rusqlite::Error> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*), COALESCE(SUM(duration_min), 0)
             FROM workouts
             WHERE completed_at >= ?1",
        )?;
        let (count, minutes) = stmt.query_row(
            params![format!("{today}T00:00:00+00:00")],
            |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)),
        )?;
        Ok(WorkoutStats {
            total_workouts: count,
            total_minutes: minutes,
            today_workouts: count,
            today_minutes: minutes,
        })
    }

    pub fn stats_all(&self) -> Result<WorkoutStats, rusqlite::Error> {
        let mut stmt = self.conn.prepare(
            "SELECT COUNT(*), COALESCE(SUM(duration_min), 0) FROM workouts",
        )?;
        let (count, minutes) =
            stmt.query_row([], |row| Ok((row.get::<_, u64>(0)?, row.get::<_, u64>(1)?)))?;

        let today = self.stats_today()?;
        Ok(WorkoutStats {
            total_workouts: count,
            total_minutes: minutes,
            today_workouts: today.today_workouts,
            today_minutes: today.today_minutes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kv_store() {
        let db = Database::open_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().unwrap(), "hello");
    }

    #[test]
    fn step_counters_default_to_zero() {
        let db = Database::open_memory().unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
        assert_eq!(db.daily_steps(date).unwrap(), 0);
        assert!(db.initial_count(date).unwrap().is_none());
        assert!(db.last_date().unwrap().is_none());

        db.set_daily_steps(date, 120).unwrap();
        db.set_initial_count(date, 5000).unwrap();
        db.set_last_date(date).unwrap();
        assert_eq!(db.daily_steps(date).unwrap(), 120);
        assert_eq!(db.initial_count(date).unwrap(), Some(5000));
        assert_eq!(db.last_date().unwrap(), Some(date));
    }

    #[test]
    fn step_history_is_newest_first() {
        let db = Database::open_memory().unwrap();
        for day in 10..=14 {
            let date = NaiveDate::from_ymd_opt(2026, 3, day).unwrap();
            db.set_daily_steps(date, day as u64 * 100).unwrap();
        }
        let history = db.step_history(3).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(
            history[0],
            (NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(), 1400)
        );
        assert_eq!(
            history[2],
            (NaiveDate::from_ymd_opt(2026, 3, 12).unwrap(), 1200)
        );
    }

    #[test]
    fn record_and_query_workouts() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_workout(5, 30, now).unwrap();
        db.record_workout(8, 15, now).unwrap();
        let stats = db.stats_all().unwrap();
        assert_eq!(stats.total_workouts, 2);
        assert_eq!(stats.total_minutes, 45);
        assert_eq!(stats.today_workouts, 2);
    }
}
