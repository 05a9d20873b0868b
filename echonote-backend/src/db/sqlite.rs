//! SQLite-backed storage for notes, entries, collaborators, and sessions.

use rusqlite::{Connection, Result as SqliteResult};
use std::path::Path;
use std::sync::Mutex;

/// Application database handle.
///
/// A single connection behind a mutex: each operation acquires the lock,
/// runs its authorization check and statements, and releases it. Check and
/// mutation therefore execute as one unit and cross-request interleaving
/// within an operation cannot occur.
pub struct Database {
    pub(crate) conn: Mutex<Connection>,
}

impl Database {
    /// Open (or create) the database file and apply the schema.
    pub fn new(database_url: &str) -> SqliteResult<Self> {
        if let Some(parent) = Path::new(database_url).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).ok();
            }
        }

        let conn = Connection::open(database_url)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::apply_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Throwaway in-memory database for tests.
    #[cfg(test)]
    pub fn open_in_memory() -> SqliteResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Self::apply_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn apply_schema(conn: &Connection) -> SqliteResult<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS notes (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                owner_id TEXT NOT NULL,
                sharing_token TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_notes_owner ON notes(owner_id);

            CREATE TABLE IF NOT EXISTS note_entries (
                id TEXT PRIMARY KEY,
                note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
                content TEXT,
                audio_url TEXT,
                entry_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_entries_note ON note_entries(note_id);

            CREATE TABLE IF NOT EXISTS collaborators (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                note_id TEXT NOT NULL REFERENCES notes(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                email TEXT,
                display_name TEXT,
                permission TEXT NOT NULL DEFAULT 'view',
                joined_at TEXT NOT NULL,
                UNIQUE(note_id, user_id)
            );

            CREATE INDEX IF NOT EXISTS idx_collaborators_user ON collaborators(user_id);

            CREATE TABLE IF NOT EXISTS auth_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                token TEXT NOT NULL UNIQUE,
                user_id TEXT NOT NULL,
                display_name TEXT,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );",
        )
    }
}
