//src/logger.rs
use crate::db::{self, ExerciseSetStore, SessionStore, SetEntry};
use crate::prompt::{is_affirmative, parse_number, title_case, Console, InputError, PromptError};
use crate::time::{Clock, TimeResolver};
use log::{debug, info, warn};
use rusqlite::Connection;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error(transparent)]
    Storage(#[from] db::Error),
    #[error(transparent)]
    Prompt(#[from] PromptError),
}

/// What one `log_workout` call wrote.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedWorkout {
    pub session_id: i64,
    pub timestamp: String,
    pub target_muscle_group: String,
    /// `(exercise name, generated set ids)` in the order the exercises were entered.
    pub exercises: Vec<(String, Vec<i64>)>,
}

impl LoggedWorkout {
    pub fn set_count(&self) -> usize {
        self.exercises.iter().map(|(_, ids)| ids.len()).sum()
    }
}

/// Exercises collected from the console but not yet written.
type StagedExercises = Vec<(String, Vec<SetEntry>)>;

/// Records one full logging transaction: a session plus every exercise and set entered
/// for it.
pub struct WorkoutLogger<'c> {
    conn: &'c mut Connection,
    clock: &'c dyn Clock,
    atomic: bool,
    require_muscle_group: bool,
}

impl<'c> WorkoutLogger<'c> {
    pub fn new(conn: &'c mut Connection, clock: &'c dyn Clock) -> Self {
        Self {
            conn,
            clock,
            atomic: false,
            require_muscle_group: false,
        }
    }

    /// When set, a storage failure rolls back the session and every set written so far.
    /// Otherwise rows written before the failure are committed.
    pub fn atomic(mut self, atomic: bool) -> Self {
        self.atomic = atomic;
        self
    }

    /// When set, an empty target muscle group is re-prompted instead of stored.
    pub fn require_muscle_group(mut self, required: bool) -> Self {
        self.require_muscle_group = required;
        self
    }

    pub fn log_workout(&mut self, console: &mut dyn Console) -> Result<LoggedWorkout, LogError> {
        let timestamp = TimeResolver::new(self.clock).resolve_time(console)?;
        let target_muscle_group = self.ask_muscle_group(console)?;

        let tx = self.conn.transaction().map_err(db::Error::Transaction)?;
        let outcome = Self::record(&tx, console, &timestamp, &target_muscle_group);

        match outcome {
            Ok(logged) => {
                tx.commit().map_err(db::Error::Transaction)?;
                info!(
                    "Logged session {} with {} set(s)",
                    logged.session_id,
                    logged.set_count()
                );
                console.say("\nAll exercises logged successfully.");
                Ok(logged)
            }
            Err(LogError::Storage(e)) if !self.atomic => {
                warn!("Storage error while logging, keeping rows already written: {e}");
                tx.commit().map_err(db::Error::Transaction)?;
                Err(e.into())
            }
            Err(e) => {
                warn!("Logging aborted, rolling back: {e}");
                tx.rollback().map_err(db::Error::Transaction)?;
                Err(e)
            }
        }
    }

    fn record(
        conn: &Connection,
        console: &mut dyn Console,
        timestamp: &str,
        target_muscle_group: &str,
    ) -> Result<LoggedWorkout, LogError> {
        let session_id = SessionStore::new(conn).create_session(timestamp, target_muscle_group)?;
        console.say(&format!("\nSession Logged Successfully! Session ID: {session_id}"));

        let staged = collect_exercises(console)?;

        let sets = ExerciseSetStore::new(conn);
        let mut exercises = Vec::with_capacity(staged.len());
        for (name, entries) in staged {
            let ids = sets.add_sets(session_id, &name, &entries)?;
            for entry in &entries {
                console.say(&format!("'{name}' - Set {} added.", entry.set_number));
            }
            exercises.push((name, ids));
        }

        Ok(LoggedWorkout {
            session_id,
            timestamp: timestamp.to_string(),
            target_muscle_group: target_muscle_group.to_string(),
            exercises,
        })
    }

    fn ask_muscle_group(&self, console: &mut dyn Console) -> Result<String, PromptError> {
        loop {
            let muscle = title_case(console.ask("Enter Target Muscle Group: ")?.trim());
            if muscle.is_empty() && self.require_muscle_group {
                console.say("Target muscle group cannot be empty.");
                continue;
            }
            return Ok(muscle);
        }
    }
}

/// Collects exercises until an empty name is entered. Nothing is written here.
fn collect_exercises(console: &mut dyn Console) -> Result<StagedExercises, PromptError> {
    console.say("\nAdd exercises to this session. Press 'ENTER' to stop.");
    let mut staged = Vec::new();
    loop {
        let name = title_case(
            console
                .ask("Enter Exercise Name (or press 'ENTER' to stop): ")?
                .trim(),
        );
        if name.is_empty() {
            break;
        }

        let mut entries = Vec::new();
        loop {
            let entry = ask_set(console)?;
            debug!("Staged set {} of '{name}'", entry.set_number);
            entries.push(entry);

            let more = console.ask("Do you want to add another set for this exercise? (y/n): ")?;
            if !is_affirmative(&more) {
                break;
            }
        }
        staged.push((name, entries));
    }
    Ok(staged)
}

/// Asks for one set until all three fields parse and are positive.
fn ask_set(console: &mut dyn Console) -> Result<SetEntry, PromptError> {
    loop {
        match read_set(console)? {
            Ok(entry) => return Ok(entry),
            Err(InputError::InvalidFormat(_)) => {
                console.say("Invalid input! Please enter valid numerical values.")
            }
            Err(InputError::InvalidValue(_)) => {
                console.say("Please enter positive values for set number, weight, and reps.")
            }
        }
    }
}

/// Reads the three fields in order, stopping at the first one that is not a number.
fn read_set(console: &mut dyn Console) -> Result<Result<SetEntry, InputError>, PromptError> {
    let set_number = match parse_number::<i64>("Set number", &console.ask("Set Number: ")?) {
        Ok(value) => value,
        Err(e) => return Ok(Err(e)),
    };
    let weight = match parse_number::<f64>("Weight", &console.ask("Weight Used (in KG): ")?) {
        Ok(value) if value.is_finite() => value,
        // `inf` and `NaN` parse as f64 but are not usable numbers.
        Ok(value) => {
            return Ok(Err(InputError::InvalidFormat(format!(
                "Weight must be a finite number, got '{value}'"
            ))))
        }
        Err(e) => return Ok(Err(e)),
    };
    let reps = match parse_number::<i64>("Reps", &console.ask("Total Reps Performed: ")?) {
        Ok(value) => value,
        Err(e) => return Ok(Err(e)),
    };
    Ok(SetEntry::new(set_number, weight, reps))
}
