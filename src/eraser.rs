//src/eraser.rs
use crate::db::{self, reset_sequence_if_empty, ExerciseSetStore, SessionStore, Table};
use log::info;
use rusqlite::Connection;

/// Row counts removed by one deletion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Deleted {
    pub sessions: usize,
    pub sets: usize,
}

impl Deleted {
    pub fn is_nothing(&self) -> bool {
        self.sessions == 0 && self.sets == 0
    }
}

/// Deletes sessions and sets, then resets the id sequence of any table left empty.
/// Each operation commits once; absent ids delete nothing and are not errors.
pub struct LogEraser<'c> {
    conn: &'c mut Connection,
}

impl<'c> LogEraser<'c> {
    pub fn new(conn: &'c mut Connection) -> Self {
        Self { conn }
    }

    /// Removes a session's sets, then the session itself.
    pub fn delete_session_cascade(&mut self, session_id: i64) -> Result<Deleted, db::Error> {
        let tx = self.conn.transaction().map_err(db::Error::Transaction)?;
        let sets = ExerciseSetStore::new(&tx).delete_by_session(session_id)?;
        let sessions = SessionStore::new(&tx).delete_session(session_id)?;
        reset_sequence_if_empty(&tx, Table::ExerciseSets)?;
        reset_sequence_if_empty(&tx, Table::Sessions)?;
        tx.commit().map_err(db::Error::Transaction)?;

        info!("Deleted session {session_id}: {sessions} session row(s), {sets} set(s)");
        Ok(Deleted { sessions, sets })
    }

    pub fn delete_single_set(&mut self, set_id: i64) -> Result<Deleted, db::Error> {
        let tx = self.conn.transaction().map_err(db::Error::Transaction)?;
        let sets = ExerciseSetStore::new(&tx).delete_set(set_id)?;
        reset_sequence_if_empty(&tx, Table::ExerciseSets)?;
        tx.commit().map_err(db::Error::Transaction)?;

        info!("Deleted set {set_id}: {sets} row(s)");
        Ok(Deleted { sessions: 0, sets })
    }

    /// Deletes every set, then every session. Both id sequences restart at 1 afterwards.
    pub fn clear_all(&mut self) -> Result<Deleted, db::Error> {
        let tx = self.conn.transaction().map_err(db::Error::Transaction)?;
        let sets = ExerciseSetStore::new(&tx).delete_all()?;
        let sessions = SessionStore::new(&tx).delete_all()?;
        reset_sequence_if_empty(&tx, Table::ExerciseSets)?;
        reset_sequence_if_empty(&tx, Table::Sessions)?;
        tx.commit().map_err(db::Error::Transaction)?;

        info!("Cleared all logs: {sessions} session(s), {sets} set(s)");
        Ok(Deleted { sessions, sets })
    }
}
