//src/db.rs
use crate::prompt::InputError;
use log::{debug, info};
use rusqlite::{params, Connection, Row};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database connection failed: {0}")]
    Connection(#[from] rusqlite::Error),
    #[error("Failed to get application data directory")]
    DataDir,
    #[error("I/O error accessing database file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Workout session not found: ID {0}")]
    SessionNotFound(i64),
    #[error("Database query failed: {0}")]
    QueryFailed(rusqlite::Error),
    #[error("Database insert failed: {0}")]
    InsertFailed(rusqlite::Error),
    #[error("Database delete failed: {0}")]
    DeleteFailed(rusqlite::Error),
    #[error("Database transaction failed: {0}")]
    Transaction(rusqlite::Error),
}

const DB_FILE_NAME: &str = "workout_log.db";
const APP_DATA_DIR: &str = "workout-log";

/// One logged workout occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkoutSession {
    pub session_id: i64,
    /// Canonical `DD-MM-YYYY | HH:MM AM/PM` text.
    pub timestamp: String,
    pub target_muscle_group: String,
}

/// One recorded set of an exercise within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseSet {
    pub set_id: i64,
    pub session_id: i64,
    pub exercise_name: String,
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
}

/// A validated set waiting to be written. Positivity is checked by `SetEntry::new`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SetEntry {
    pub set_number: i64,
    pub weight: f64,
    pub reps: i64,
}

impl SetEntry {
    /// Builds an entry, rejecting any non-positive field and non-finite weights.
    pub fn new(set_number: i64, weight: f64, reps: i64) -> Result<Self, InputError> {
        if set_number <= 0 || reps <= 0 || !weight.is_finite() || weight <= 0.0 {
            return Err(InputError::InvalidValue(
                "set number, weight and reps must all be positive".to_string(),
            ));
        }
        Ok(Self {
            set_number,
            weight,
            reps,
        })
    }
}

/// Parallel sequences for every set ever recorded under one exercise name,
/// merged across sessions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseAggregate {
    pub set_numbers: Vec<i64>,
    pub weights: Vec<f64>,
    pub reps: Vec<i64>,
}

impl ExerciseAggregate {
    pub fn len(&self) -> usize {
        self.set_numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set_numbers.is_empty()
    }
}

/// Tables whose identifier sequence can be reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Sessions,
    ExerciseSets,
}

impl Table {
    pub const fn name(self) -> &'static str {
        match self {
            Table::Sessions => "workout_sessions",
            Table::ExerciseSets => "workout_exercises",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Gets the default path to the SQLite database file within the app's data directory.
/// Creates the directory if it doesn't exist.
pub fn get_db_path() -> Result<PathBuf, Error> {
    let data_dir = dirs::data_dir().ok_or(Error::DataDir)?;
    let app_dir = data_dir.join(APP_DATA_DIR);
    if !app_dir.exists() {
        std::fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join(DB_FILE_NAME))
}

/// Opens a connection to the SQLite database, creating parent directories as needed.
pub fn open_db<P: AsRef<Path>>(path: P) -> Result<Connection, Error> {
    if let Some(parent) = path.as_ref().parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Connection::open(path).map_err(Error::Connection)
}

/// Initializes the database tables if they don't exist.
///
/// The foreign key on `workout_exercises.session_id` is declarative only; SQLite does not
/// enforce it unless `PRAGMA foreign_keys` is switched on, and this crate never does.
pub fn init(conn: &Connection) -> Result<(), Error> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS workout_sessions (
            session_id INTEGER PRIMARY KEY AUTOINCREMENT,
            date_time TEXT NOT NULL,
            target_muscle TEXT NOT NULL
        )",
        [],
    )
    .map_err(Error::Connection)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS workout_exercises (
            exercise_id INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id INTEGER,
            exercise_name TEXT NOT NULL,
            set_number INTEGER NOT NULL,
            weight REAL NOT NULL,
            reps INTEGER NOT NULL,
            FOREIGN KEY (session_id) REFERENCES workout_sessions(session_id)
        )",
        [],
    )
    .map_err(Error::Connection)?;

    Ok(())
}

/// Returns the number of rows currently in `table`.
pub fn count_rows(conn: &Connection, table: Table) -> Result<i64, Error> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .map_err(Error::QueryFailed)
}

/// Restarts the identifier sequence of `table` at 1, but only when the table is empty.
///
/// A non-empty table keeps its sequence, so ids stay monotonic and gaps left by earlier
/// deletions are never reused. Returns whether a reset happened.
pub fn reset_sequence_if_empty(conn: &Connection, table: Table) -> Result<bool, Error> {
    if count_rows(conn, table)? > 0 {
        debug!("{table} still has rows, leaving its id sequence alone");
        return Ok(false);
    }
    conn.execute(
        "DELETE FROM sqlite_sequence WHERE name = ?1",
        params![table.name()],
    )
    .map_err(Error::DeleteFailed)?;
    info!("{table} is empty, id sequence reset");
    Ok(true)
}

fn map_row_to_session(row: &Row) -> Result<WorkoutSession, rusqlite::Error> {
    Ok(WorkoutSession {
        session_id: row.get(0)?,
        timestamp: row.get(1)?,
        target_muscle_group: row.get(2)?,
    })
}

fn map_row_to_set(row: &Row) -> Result<ExerciseSet, rusqlite::Error> {
    Ok(ExerciseSet {
        set_id: row.get(0)?,
        session_id: row.get(1)?,
        exercise_name: row.get(2)?,
        set_number: row.get(3)?,
        weight: row.get(4)?,
        reps: row.get(5)?,
    })
}

// ---- Sessions ----

/// Creates and enumerates workout sessions over a borrowed connection.
pub struct SessionStore<'c> {
    conn: &'c Connection,
}

impl<'c> SessionStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Inserts one session row and returns its generated id.
    pub fn create_session(&self, timestamp: &str, target_muscle_group: &str) -> Result<i64, Error> {
        self.conn
            .execute(
                "INSERT INTO workout_sessions (date_time, target_muscle) VALUES (?1, ?2)",
                params![timestamp, target_muscle_group],
            )
            .map_err(Error::InsertFailed)?;
        let id = self.conn.last_insert_rowid();
        debug!("Created session {id} ({target_muscle_group}, {timestamp})");
        Ok(id)
    }

    /// All sessions in insertion order.
    pub fn list_sessions(&self) -> Result<Vec<WorkoutSession>, Error> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT session_id, date_time, target_muscle
                 FROM workout_sessions ORDER BY session_id ASC",
            )
            .map_err(Error::QueryFailed)?;
        let rows = stmt
            .query_map([], map_row_to_session)
            .map_err(Error::QueryFailed)?;

        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session.map_err(Error::QueryFailed)?);
        }
        Ok(sessions)
    }

    pub fn session_exists(&self, session_id: i64) -> Result<bool, Error> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM workout_sessions WHERE session_id = ?1)",
                params![session_id],
                |row| row.get(0),
            )
            .map_err(Error::QueryFailed)
    }

    /// Removes the session row if present. Deleting an absent id is not an error.
    pub fn delete_session(&self, session_id: i64) -> Result<usize, Error> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM workout_sessions WHERE session_id = ?1",
                params![session_id],
            )
            .map_err(Error::DeleteFailed)?;
        debug!("delete_session({session_id}) removed {rows} row(s)");
        Ok(rows)
    }

    pub fn delete_all(&self) -> Result<usize, Error> {
        self.conn
            .execute("DELETE FROM workout_sessions", [])
            .map_err(Error::DeleteFailed)
    }
}

// ---- Exercise sets ----

/// Creates, enumerates, aggregates and deletes exercise-set rows.
pub struct ExerciseSetStore<'c> {
    conn: &'c Connection,
}

impl<'c> ExerciseSetStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Inserts one row per entry, in input order, and returns the generated ids.
    ///
    /// Rows are written one at a time. If an insert fails, rows already written for this
    /// batch are left in place; whether they survive depends on the caller's transaction.
    pub fn add_sets(
        &self,
        session_id: i64,
        exercise_name: &str,
        sets: &[SetEntry],
    ) -> Result<Vec<i64>, Error> {
        if !SessionStore::new(self.conn).session_exists(session_id)? {
            return Err(Error::SessionNotFound(session_id));
        }

        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO workout_exercises (session_id, exercise_name, set_number, weight, reps)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .map_err(Error::InsertFailed)?;

        let mut ids = Vec::with_capacity(sets.len());
        for set in sets {
            stmt.execute(params![
                session_id,
                exercise_name,
                set.set_number,
                set.weight,
                set.reps
            ])
            .map_err(Error::InsertFailed)?;
            ids.push(self.conn.last_insert_rowid());
        }
        debug!(
            "Added {} set(s) of '{exercise_name}' to session {session_id}",
            ids.len()
        );
        Ok(ids)
    }

    /// Every set, ordered by session then set number. Equal set numbers keep insertion order.
    pub fn list_by_session(&self) -> Result<Vec<ExerciseSet>, Error> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT exercise_id, session_id, exercise_name, set_number, weight, reps
                 FROM workout_exercises
                 ORDER BY session_id ASC, set_number ASC, exercise_id ASC",
            )
            .map_err(Error::QueryFailed)?;
        let rows = stmt
            .query_map([], map_row_to_set)
            .map_err(Error::QueryFailed)?;

        let mut sets = Vec::new();
        for set in rows {
            sets.push(set.map_err(Error::QueryFailed)?);
        }
        Ok(sets)
    }

    /// Groups every set by exercise name alone.
    ///
    /// Sets from different sessions that share a name land in the same aggregate. Within a
    /// group entries are ordered by set number, ties broken by insertion order.
    pub fn aggregate_by_exercise_name(&self) -> Result<BTreeMap<String, ExerciseAggregate>, Error> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT exercise_name, set_number, weight, reps
                 FROM workout_exercises
                 ORDER BY set_number ASC, exercise_id ASC",
            )
            .map_err(Error::QueryFailed)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, f64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(Error::QueryFailed)?;

        let mut aggregates: BTreeMap<String, ExerciseAggregate> = BTreeMap::new();
        for row in rows {
            let (name, set_number, weight, reps) = row.map_err(Error::QueryFailed)?;
            let entry = aggregates.entry(name).or_default();
            entry.set_numbers.push(set_number);
            entry.weights.push(weight);
            entry.reps.push(reps);
        }
        Ok(aggregates)
    }

    /// Removes one set row if present. Idempotent.
    pub fn delete_set(&self, set_id: i64) -> Result<usize, Error> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM workout_exercises WHERE exercise_id = ?1",
                params![set_id],
            )
            .map_err(Error::DeleteFailed)?;
        debug!("delete_set({set_id}) removed {rows} row(s)");
        Ok(rows)
    }

    /// Removes every set of one session. Idempotent.
    pub fn delete_by_session(&self, session_id: i64) -> Result<usize, Error> {
        let rows = self
            .conn
            .execute(
                "DELETE FROM workout_exercises WHERE session_id = ?1",
                params![session_id],
            )
            .map_err(Error::DeleteFailed)?;
        debug!("delete_by_session({session_id}) removed {rows} row(s)");
        Ok(rows)
    }

    pub fn delete_all(&self) -> Result<usize, Error> {
        self.conn
            .execute("DELETE FROM workout_exercises", [])
            .map_err(Error::DeleteFailed)
    }
}
