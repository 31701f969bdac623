//src/viewer.rs
use crate::db::{self, ExerciseAggregate, ExerciseSet, ExerciseSetStore, SessionStore, WorkoutSession};
use rusqlite::Connection;
use std::collections::BTreeMap;

/// Result of a read: either nothing was stored, or the rows found.
#[derive(Debug, Clone, PartialEq)]
pub enum LogView<T> {
    NothingFound,
    Found(T),
}

impl<T> LogView<T> {
    pub fn found(self) -> Option<T> {
        match self {
            LogView::Found(value) => Some(value),
            LogView::NothingFound => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, LogView::NothingFound)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct FullLog {
    /// Empty when session details were not requested.
    pub sessions: Vec<WorkoutSession>,
    pub sets: Vec<ExerciseSet>,
}

/// Read-only queries over the stored log.
pub struct LogViewer<'c> {
    conn: &'c Connection,
}

impl<'c> LogViewer<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// Sessions (when `include_sessions`) followed by every set in session order.
    ///
    /// Reports `NothingFound` when no session exists, matching the listing shown to users.
    pub fn full_listing(&self, include_sessions: bool) -> Result<LogView<FullLog>, db::Error> {
        let sessions = SessionStore::new(self.conn).list_sessions()?;
        if sessions.is_empty() {
            return Ok(LogView::NothingFound);
        }
        let sets = ExerciseSetStore::new(self.conn).list_by_session()?;
        Ok(LogView::Found(FullLog {
            sessions: if include_sessions { sessions } else { Vec::new() },
            sets,
        }))
    }

    /// Per-exercise parallel sequences, merged across sessions.
    pub fn aggregated_listing(
        &self,
    ) -> Result<LogView<BTreeMap<String, ExerciseAggregate>>, db::Error> {
        let aggregates = ExerciseSetStore::new(self.conn).aggregate_by_exercise_name()?;
        if aggregates.is_empty() {
            Ok(LogView::NothingFound)
        } else {
            Ok(LogView::Found(aggregates))
        }
    }

    pub fn sessions(&self) -> Result<LogView<Vec<WorkoutSession>>, db::Error> {
        let sessions = SessionStore::new(self.conn).list_sessions()?;
        Ok(if sessions.is_empty() {
            LogView::NothingFound
        } else {
            LogView::Found(sessions)
        })
    }

    pub fn sets(&self) -> Result<LogView<Vec<ExerciseSet>>, db::Error> {
        let sets = ExerciseSetStore::new(self.conn).list_by_session()?;
        Ok(if sets.is_empty() {
            LogView::NothingFound
        } else {
            LogView::Found(sets)
        })
    }
}
