use anyhow::{Context, Result};
use log::debug;
use rusqlite::Connection;
use std::path::{Path, PathBuf};

// --- Declare modules ---
pub mod config;
pub mod db;
pub mod eraser;
pub mod logger;
pub mod prompt;
pub mod time;
pub mod viewer;

// --- Expose public types ---
pub use config::{
    get_config_path as get_config_path_util, load as load_config_util, parse_color,
    save as save_config_util, Config, Error as ConfigError, StandardColor, Theme,
};
pub use db::{
    get_db_path as get_db_path_util, reset_sequence_if_empty, Error as DbError,
    ExerciseAggregate, ExerciseSet, ExerciseSetStore, SessionStore, SetEntry, Table,
    WorkoutSession,
};
pub use eraser::{Deleted, LogEraser};
pub use logger::{LogError, LoggedWorkout, WorkoutLogger};
pub use prompt::{Console, InputError, PromptError, ScriptedConsole, StdConsole};
pub use time::{Clock, FixedClock, SystemClock, TimeResolver};
pub use viewer::{FullLog, LogView, LogViewer};

/// Owns the single database connection and the configuration for the process lifetime,
/// and hands out the components that operate on them.
pub struct AppService {
    pub config: Config,
    pub conn: Connection,
    pub db_path: PathBuf,
    pub config_path: PathBuf,
}

impl AppService {
    /// Loads the config, opens the database and makes sure the schema exists.
    /// `db_override` takes precedence over the configured database path.
    /// # Errors
    /// Returns `anyhow::Error` if config/db path determination, loading, or initialization fails.
    pub fn initialize(db_override: Option<PathBuf>) -> Result<Self> {
        let config_path =
            config::get_config_path().context("Failed to determine configuration file path")?;
        let config = config::load(&config_path)
            .with_context(|| format!("Failed to load config from {config_path:?}"))?;

        let db_path = match db_override.or_else(|| config.database_path.clone()) {
            Some(path) => path,
            None => db::get_db_path().context("Failed to determine database path")?,
        };
        let conn = db::open_db(&db_path)
            .with_context(|| format!("Failed to open database at {db_path:?}"))?;
        db::init(&conn).context("Failed to initialize database schema")?;
        debug!("Opened database at {db_path:?}");

        Ok(Self {
            config,
            conn,
            db_path,
            config_path,
        })
    }

    /// Wraps an already initialized connection, e.g. an in-memory database.
    pub fn with_connection(conn: Connection, config: Config) -> Self {
        Self {
            config,
            conn,
            db_path: ":memory:".into(),
            config_path: PathBuf::new(),
        }
    }

    pub fn get_db_path(&self) -> &Path {
        &self.db_path
    }

    pub fn get_config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn sessions(&self) -> SessionStore<'_> {
        SessionStore::new(&self.conn)
    }

    pub fn sets(&self) -> ExerciseSetStore<'_> {
        ExerciseSetStore::new(&self.conn)
    }

    pub fn viewer(&self) -> LogViewer<'_> {
        LogViewer::new(&self.conn)
    }

    pub fn eraser(&mut self) -> LogEraser<'_> {
        LogEraser::new(&mut self.conn)
    }

    /// A logger configured from `atomic_logging` and `require_muscle_group`.
    pub fn logger<'a>(&'a mut self, clock: &'a dyn Clock) -> WorkoutLogger<'a> {
        WorkoutLogger::new(&mut self.conn, clock)
            .atomic(self.config.atomic_logging)
            .require_muscle_group(self.config.require_muscle_group)
    }

    /// Closes the connection, reporting any error SQLite raises on close.
    pub fn close(self) -> Result<()> {
        self.conn
            .close()
            .map_err(|(_, e)| e)
            .with_context(|| format!("Failed to close database at {:?}", self.db_path))
    }
}
