//! Note entry table operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::super::Database;
use super::notes;
use crate::access::{self, Action};
use crate::errors::{StoreError, StoreResult};
use crate::models::{CreateEntryRequest, NoteEntry, UpdateEntryRequest};

impl Database {
    /// Append an entry to a note. Requires edit access to the parent note;
    /// an entry needs text, audio, or both.
    pub fn create_entry(
        &self,
        caller: &str,
        note_id: &str,
        req: &CreateEntryRequest,
    ) -> StoreResult<NoteEntry> {
        if req.content.is_none() && req.audio_url.is_none() {
            return Err(StoreError::InvalidInput {
                message: "entry needs content or audio_url".to_string(),
            });
        }

        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Update)?;

        let entry_order = match req.entry_order {
            Some(order) => order,
            None => conn.query_row(
                "SELECT COALESCE(MAX(entry_order), -1) + 1 FROM note_entries WHERE note_id = ?1",
                [note_id],
                |row| row.get(0),
            )?,
        };

        let now = Utc::now();
        let entry = NoteEntry {
            id: Uuid::new_v4().to_string(),
            note_id: note_id.to_string(),
            content: req.content.clone(),
            audio_url: req.audio_url.clone(),
            entry_order,
            created_at: now,
            updated_at: now,
        };

        conn.execute(
            "INSERT INTO note_entries (id, note_id, content, audio_url, entry_order, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                entry.id,
                entry.note_id,
                entry.content,
                entry.audio_url,
                entry.entry_order,
                now.to_rfc3339(),
            ],
        )?;
        notes::touch_note(&conn, note_id)?;

        Ok(entry)
    }

    /// Fetch a single entry. Requires read access to the parent note.
    pub fn get_entry(&self, caller: &str, note_id: &str, entry_id: &str) -> StoreResult<NoteEntry> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Read)?;

        load_entry(&conn, note_id, entry_id)?.ok_or_else(|| StoreError::NotFound {
            id: entry_id.to_string(),
        })
    }

    /// Update an entry's content, audio pointer, or position. Absent
    /// fields keep their current value.
    pub fn update_entry(
        &self,
        caller: &str,
        note_id: &str,
        entry_id: &str,
        req: &UpdateEntryRequest,
    ) -> StoreResult<NoteEntry> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Update)?;

        let existing = load_entry(&conn, note_id, entry_id)?.ok_or_else(|| StoreError::NotFound {
            id: entry_id.to_string(),
        })?;

        let content = req.content.clone().or(existing.content);
        let audio_url = req.audio_url.clone().or(existing.audio_url);
        let entry_order = req.entry_order.unwrap_or(existing.entry_order);
        let now = Utc::now();

        conn.execute(
            "UPDATE note_entries
             SET content = ?1, audio_url = ?2, entry_order = ?3, updated_at = ?4
             WHERE id = ?5 AND note_id = ?6",
            params![
                content,
                audio_url,
                entry_order,
                now.to_rfc3339(),
                entry_id,
                note_id,
            ],
        )?;
        notes::touch_note(&conn, note_id)?;

        Ok(NoteEntry {
            id: existing.id,
            note_id: existing.note_id,
            content,
            audio_url,
            entry_order,
            created_at: existing.created_at,
            updated_at: now,
        })
    }

    /// Delete an entry. Owner of the parent note only.
    pub fn delete_entry(&self, caller: &str, note_id: &str, entry_id: &str) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Delete)?;

        let removed = conn.execute(
            "DELETE FROM note_entries WHERE id = ?1 AND note_id = ?2",
            params![entry_id, note_id],
        )?;
        if removed == 0 {
            return Err(StoreError::NotFound {
                id: entry_id.to_string(),
            });
        }
        notes::touch_note(&conn, note_id)?;

        Ok(())
    }
}

/// Entries of a note in display order; equal `entry_order` values resolve
/// by insertion order.
pub(crate) fn load_entries(conn: &Connection, note_id: &str) -> rusqlite::Result<Vec<NoteEntry>> {
    let mut stmt = conn.prepare(
        "SELECT id, note_id, content, audio_url, entry_order, created_at, updated_at
         FROM note_entries WHERE note_id = ?1
         ORDER BY entry_order, rowid",
    )?;

    stmt.query_map([note_id], row_to_entry)?
        .collect::<rusqlite::Result<Vec<_>>>()
}

fn load_entry(
    conn: &Connection,
    note_id: &str,
    entry_id: &str,
) -> rusqlite::Result<Option<NoteEntry>> {
    conn.query_row(
        "SELECT id, note_id, content, audio_url, entry_order, created_at, updated_at
         FROM note_entries WHERE id = ?1 AND note_id = ?2",
        params![entry_id, note_id],
        row_to_entry,
    )
    .optional()
}

fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<NoteEntry> {
    let created_at_str: String = row.get(5)?;
    let updated_at_str: String = row.get(6)?;

    Ok(NoteEntry {
        id: row.get(0)?,
        note_id: row.get(1)?,
        content: row.get(2)?,
        audio_url: row.get(3)?,
        entry_order: row.get(4)?,
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
    use crate::models::{
        CreateEntryRequest, InviteCollaboratorRequest, Permission, UpdateEntryRequest,
    };

    fn text_entry(content: &str) -> CreateEntryRequest {
        CreateEntryRequest {
            content: Some(content.to_string()),
            audio_url: None,
            entry_order: None,
        }
    }

    #[test]
    fn test_empty_entry_rejected() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Empty").unwrap();

        let err = db
            .create_entry(
                "alice",
                &note.id,
                &CreateEntryRequest {
                    content: None,
                    audio_url: None,
                    entry_order: None,
                },
            )
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput { .. }));
    }

    #[test]
    fn test_entry_order_defaults_to_append() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "List").unwrap();

        let first = db.create_entry("alice", &note.id, &text_entry("a")).unwrap();
        let second = db.create_entry("alice", &note.id, &text_entry("b")).unwrap();
        assert_eq!(first.entry_order, 0);
        assert_eq!(second.entry_order, 1);
    }

    #[test]
    fn test_order_ties_resolve_by_insertion() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Ties").unwrap();

        for content in ["a", "b", "c"] {
            db.create_entry(
                "alice",
                &note.id,
                &CreateEntryRequest {
                    content: Some(content.to_string()),
                    audio_url: None,
                    entry_order: Some(5),
                },
            )
            .unwrap();
        }

        let detail = db.get_note_detail("alice", &note.id).unwrap();
        let contents: Vec<&str> = detail
            .entries
            .iter()
            .map(|e| e.content.as_deref().unwrap())
            .collect();
        assert_eq!(contents, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_edit_collaborator_can_write_but_not_delete() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Shared").unwrap();
        db.invite_collaborator(
            "alice",
            &note.id,
            &InviteCollaboratorRequest {
                user_id: Some("bob".to_string()),
                email: None,
                display_name: None,
                permission: Permission::Edit,
            },
        )
        .unwrap();

        let entry = db.create_entry("bob", &note.id, &text_entry("from bob")).unwrap();

        let updated = db
            .update_entry(
                "bob",
                &note.id,
                &entry.id,
                &UpdateEntryRequest {
                    content: Some("edited".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.content.as_deref(), Some("edited"));

        let err = db.delete_entry("bob", &note.id, &entry.id).unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));

        db.delete_entry("alice", &note.id, &entry.id).unwrap();
    }

    #[test]
    fn test_view_collaborator_cannot_create_entries() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "ReadOnly").unwrap();
        db.invite_collaborator(
            "alice",
            &note.id,
            &InviteCollaboratorRequest {
                user_id: Some("bob".to_string()),
                email: None,
                display_name: None,
                permission: Permission::View,
            },
        )
        .unwrap();

        let err = db
            .create_entry("bob", &note.id, &text_entry("not allowed"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Unauthorized));
    }

    #[test]
    fn test_update_preserves_absent_fields() {
        let db = Database::open_in_memory().unwrap();
        let note = db.create_note("alice", "Audio").unwrap();
        let entry = db
            .create_entry(
                "alice",
                &note.id,
                &CreateEntryRequest {
                    content: Some("transcript".to_string()),
                    audio_url: Some("http://localhost:8080/media/clip.webm".to_string()),
                    entry_order: None,
                },
            )
            .unwrap();

        let updated = db
            .update_entry(
                "alice",
                &note.id,
                &entry.id,
                &UpdateEntryRequest {
                    entry_order: Some(3),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.content.as_deref(), Some("transcript"));
        assert_eq!(
            updated.audio_url.as_deref(),
            Some("http://localhost:8080/media/clip.webm")
        );
        assert_eq!(updated.entry_order, 3);
    }

    #[test]
    fn test_entry_scoped_to_note() {
        let db = Database::open_in_memory().unwrap();
        let first = db.create_note("alice", "One").unwrap();
        let second = db.create_note("alice", "Two").unwrap();
        let entry = db.create_entry("alice", &first.id, &text_entry("a")).unwrap();

        let err = db.get_entry("alice", &second.id, &entry.id).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }
}
