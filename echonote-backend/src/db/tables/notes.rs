//! Note table operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::super::Database;
use super::{collaborators, note_entries};
use crate::access::{self, Action};
use crate::errors::{StoreError, StoreResult};
use crate::models::{Note, NoteDetail, NoteEntry};

impl Database {
    /// Create a note owned by the caller, with no collaborators and no
    /// share token.
    pub fn create_note(&self, caller: &str, title: &str) -> StoreResult<Note> {
        let conn = self.conn.lock().unwrap();
        let now = Utc::now();

        let note = Note {
            id: Uuid::new_v4().to_string(),
            title: title.to_string(),
            owner_id: caller.to_string(),
            sharing_token: None,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO notes (id, title, owner_id, sharing_token, created_at, updated_at)
             VALUES (?1, ?2, ?3, NULL, ?4, ?4)",
            params![note.id, note.title, note.owner_id, now.to_rfc3339()],
        )?;

        Ok(note)
    }

    /// Fetch a note the caller may read.
    pub fn get_note(&self, caller: &str, note_id: &str) -> StoreResult<Note> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Read)?;

        load_note(&conn, note_id)?.ok_or_else(|| StoreError::NotFound {
            id: note_id.to_string(),
        })
    }

    /// Fetch a note with its entries and collaborator set.
    pub fn get_note_detail(&self, caller: &str, note_id: &str) -> StoreResult<NoteDetail> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Read)?;

        let note = load_note(&conn, note_id)?.ok_or_else(|| StoreError::NotFound {
            id: note_id.to_string(),
        })?;
        let entries = note_entries::load_entries(&conn, note_id)?;
        let collaborators = collaborators::load_collaborators(&conn, note_id)?;

        Ok(NoteDetail {
            note,
            entries,
            collaborators,
        })
    }

    /// Notes the caller owns or collaborates on, most recently updated
    /// first.
    pub fn list_notes(&self, caller: &str) -> StoreResult<Vec<Note>> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn.prepare(
            "SELECT DISTINCT n.id, n.title, n.owner_id, n.sharing_token, n.created_at, n.updated_at
             FROM notes n
             LEFT JOIN collaborators c ON c.note_id = n.id
             WHERE n.owner_id = ?1 OR c.user_id = ?1
             ORDER BY n.updated_at DESC",
        )?;

        let notes = stmt
            .query_map([caller], row_to_note)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(notes)
    }

    /// Retitle a note. Requires edit access.
    pub fn update_note_title(&self, caller: &str, note_id: &str, title: &str) -> StoreResult<Note> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Update)?;

        conn.execute(
            "UPDATE notes SET title = ?1, updated_at = ?2 WHERE id = ?3",
            params![title, Utc::now().to_rfc3339(), note_id],
        )?;

        load_note(&conn, note_id)?.ok_or_else(|| StoreError::NotFound {
            id: note_id.to_string(),
        })
    }

    /// Delete a note. Owner-only; entries and collaborators go with it
    /// through the cascade.
    pub fn delete_note(&self, caller: &str, note_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Delete)?;

        conn.execute("DELETE FROM notes WHERE id = ?1", [note_id])?;
        Ok(())
    }

    /// Read a note through its share token. No session required; the
    /// (note id, token) pair is the capability, and the view is read-only.
    pub fn get_shared_note(
        &self,
        note_id: &str,
        token: &str,
    ) -> StoreResult<(Note, Vec<NoteEntry>)> {
        let conn = self.conn.lock().unwrap();

        let note = load_note(&conn, note_id)?.ok_or_else(|| StoreError::NotFound {
            id: note_id.to_string(),
        })?;

        match note.sharing_token.as_deref() {
            Some(stored) if stored == token => {}
            _ => return Err(StoreError::Unauthorized),
        }

        let entries = note_entries::load_entries(&conn, note_id)?;
        Ok((note, entries))
    }
}

pub(crate) fn load_note(conn: &Connection, note_id: &str) -> rusqlite::Result<Option<Note>> {
    conn.query_row(
        "SELECT id, title, owner_id, sharing_token, created_at, updated_at
         FROM notes WHERE id = ?1",
        [note_id],
        row_to_note,
    )
    .optional()
}

/// Refresh the parent note's `updated_at` after an entry or collaborator
/// mutation.
pub(crate) fn touch_note(conn: &Connection, note_id: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE notes SET updated_at = ?1 WHERE id = ?2",
        params![Utc::now().to_rfc3339(), note_id],
    )?;
    Ok(())
}

pub(crate) fn row_to_note(row: &rusqlite::Row) -> rusqlite::Result<Note> {
    let created_at_str: String = row.get(4)?;
    let updated_at_str: String = row.get(5)?;

    Ok(Note {
        id: row.get(0)?,
        title: row.get(1)?,
        owner_id: row.get(2)?,
        sharing_token: row.get(3)?,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .unwrap()
            .with_timezone(&Utc),
        updated_at: DateTime::parse_from_rfc3339(&updated_at_str)
            .unwrap()
            .with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use crate::db::Database;
    use crate::errors::StoreError;
    use crate::models::{CreateEntryRequest, InviteCollaboratorRequest, Permission};

    fn invite(user_id: &str, permission: Permission) -> InviteCollaboratorRequest {
        InviteCollaboratorRequest {
            user_id: Some(user_id.to_string()),
            email: None,
            display_name: None,
            permission,
        }
    }

    #[test]
    fn test_create_and_get_note() {
        let db = Database::open_in_memory().unwrap();

        let note = db.create_note("alice", "Groceries").unwrap();
        assert_eq!(note.owner_id, "alice");
        assert!(note.sharing_token.is_none());

        let fetched = db.get_note("alice", &note.id).unwrap();
        assert_eq!(fetched.title, "Groceries");
    }

    #[test]
    fn test_get_note_denied_for_stranger() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Private").unwrap();

        let err = db.get_note("mallory", &note.id).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn test_get_missing_note_is_not_found() {
        let db = Database::open_in_memory().unwrap();

        let err = db.get_note("alice", "no-such-id").unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[test]
    fn test_list_notes_includes_shared() {
        let db = Database::open_in_memory().unwrap();

        let own = db.create_note("bob", "Mine").unwrap();
        let shared = db.create_note("alice", "Ours").unwrap();
        db.invite_collaborator("alice", &shared.id, &invite("bob", Permission::View))
            .unwrap();
        db.create_note("alice", "Not bobs").unwrap();

        let notes = db.list_notes("bob").unwrap();
        let ids: Vec<&str> = notes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(notes.len(), 2);
        assert!(ids.contains(&own.id.as_str()));
        assert!(ids.contains(&shared.id.as_str()));
    }

    #[test]
    fn test_retitle_requires_edit() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Draft").unwrap();
        db.invite_collaborator("alice", &note.id, &invite("bob", Permission::View))
            .unwrap();

        let err = db.update_note_title("bob", &note.id, "Renamed").unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));

        db.update_collaborator_permission("alice", &note.id, "bob", Permission::Edit)
            .unwrap();
        let updated = db.update_note_title("bob", &note.id, "Renamed").unwrap();
        assert_eq!(updated.title, "Renamed");
    }

    #[test]
    fn test_delete_cascades_to_entries_and_collaborators() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Ephemeral").unwrap();
        db.create_entry(
            "alice",
            &note.id,
            &CreateEntryRequest {
                content: Some("first".to_string()),
                audio_url: None,
                entry_order: None,
            },
        )
        .unwrap();
        db.invite_collaborator("alice", &note.id, &invite("bob", Permission::Edit))
            .unwrap();

        // Collaborators may not delete
        let err = db.delete_note("bob", &note.id).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));

        db.delete_note("alice", &note.id).unwrap();
        assert!(matches!(
            db.get_note("alice", &note.id).unwrap_err(),
            StoreError::NotFound { .. }
        ));

        // Child rows are gone too
        let conn = db.conn.lock().unwrap();
        let entries: i64 = conn
            .query_row("SELECT COUNT(*) FROM note_entries", [], |r| r.get(0))
            .unwrap();
        let collabs: i64 = conn
            .query_row("SELECT COUNT(*) FROM collaborators", [], |r| r.get(0))
            .unwrap();
        assert_eq!(entries, 0);
        assert_eq!(collabs, 0);
    }
}
