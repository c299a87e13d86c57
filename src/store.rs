use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::Path;

use crate::app_dirs::AppDirs;
use crate::error::{Error, Result};
use crate::solve::{Event, Scope, Solve, SolveHistory, SolveId};

/// SQLite backed solve storage, one table for every event and session
#[derive(Debug)]
pub struct SolveStore {
    conn: Connection,
}

impl SolveStore {
    /// Open the database under `$HOME/.local/state/stackr`
    pub fn open_default() -> Result<Self> {
        let path = AppDirs::db_path().ok_or(Error::NoStateDir)?;
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        Self::with_connection(conn)
    }

    pub fn in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS solves (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                event TEXT NOT NULL,
                session INTEGER NOT NULL,
                time_ms REAL NOT NULL,
                timestamp TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_solves_scope ON solves(event, session)",
            [],
        )?;

        Ok(SolveStore { conn })
    }

    /// Persist a new solve and return it with its assigned id
    pub fn record_solve(
        &self,
        scope: Scope,
        time_ms: f64,
        timestamp: DateTime<Local>,
    ) -> Result<Solve> {
        self.conn.execute(
            "INSERT INTO solves (event, session, time_ms, timestamp) VALUES (?1, ?2, ?3, ?4)",
            params![
                scope.event.to_string(),
                scope.session,
                time_ms,
                timestamp.to_rfc3339(),
            ],
        )?;

        Ok(Solve {
            id: SolveId(self.conn.last_insert_rowid()),
            time_ms,
            timestamp,
            event: scope.event,
            session: scope.session,
        })
    }

    /// Solves of one scope, newest first
    pub fn load_history(&self, scope: Scope) -> Result<SolveHistory> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, time_ms, timestamp
            FROM solves
            WHERE event = ?1 AND session = ?2
            ORDER BY id DESC
            "#,
        )?;

        let solve_iter = stmt.query_map(
            params![scope.event.to_string(), scope.session],
            |row| {
                let timestamp_str: String = row.get(2)?;
                let timestamp = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map_err(|_| {
                        rusqlite::Error::InvalidColumnType(
                            2,
                            "timestamp".to_string(),
                            rusqlite::types::Type::Text,
                        )
                    })?
                    .with_timezone(&Local);

                Ok(Solve {
                    id: SolveId(row.get(0)?),
                    time_ms: row.get(1)?,
                    timestamp,
                    event: scope.event,
                    session: scope.session,
                })
            },
        )?;

        let mut solves = Vec::new();
        for solve in solve_iter {
            solves.push(solve?);
        }

        Ok(SolveHistory::from_newest_first(solves))
    }

    /// Returns true if a row was deleted
    pub fn remove_solve(&self, id: SolveId) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM solves WHERE id = ?1", params![id.0])?;
        Ok(deleted > 0)
    }

    pub fn clear_session(&self, scope: Scope) -> Result<usize> {
        let deleted = self.conn.execute(
            "DELETE FROM solves WHERE event = ?1 AND session = ?2",
            params![scope.event.to_string(), scope.session],
        )?;
        Ok(deleted)
    }

    /// Sessions that hold at least one solve for `event`, ascending
    pub fn sessions(&self, event: Event) -> Result<Vec<u32>> {
        let mut stmt = self.conn.prepare(
            "SELECT DISTINCT session FROM solves WHERE event = ?1 ORDER BY session",
        )?;
        let rows = stmt.query_map([event.to_string()], |row| row.get::<_, u32>(0))?;

        let mut sessions = Vec::new();
        for session in rows {
            sessions.push(session?);
        }
        Ok(sessions)
    }
}
