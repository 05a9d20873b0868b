//! Collaborator registry and share-token operations

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use super::super::Database;
use super::notes;
use crate::access::{self, Action};
use crate::errors::{StoreError, StoreResult};
use crate::models::{email_user_id, Collaborator, InviteCollaboratorRequest, Permission};

impl Database {
    /// Invite a collaborator. Owner-only.
    ///
    /// Rejects an invite whose user id or email is already present on the
    /// note. The duplicate check and the insert run under the same
    /// connection lock, backed by the `UNIQUE(note_id, user_id)` index, so
    /// concurrent invitations cannot slip past each other.
    pub fn invite_collaborator(
        &self,
        caller: &str,
        note_id: &str,
        req: &InviteCollaboratorRequest,
    ) -> StoreResult<Collaborator> {
        let email = req
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty());

        let user_id = match (req.user_id.as_deref().map(str::trim), email.as_deref()) {
            (Some(u), _) if !u.is_empty() => u.to_string(),
            (_, Some(e)) => email_user_id(e),
            _ => {
                return Err(StoreError::InvalidInput {
                    message: "invite needs a user_id or an email".to_string(),
                });
            }
        };

        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::ManageSharing)?;

        let duplicate: Option<String> = conn
            .query_row(
                "SELECT user_id FROM collaborators
                 WHERE note_id = ?1 AND (user_id = ?2 OR (email IS NOT NULL AND email = ?3))",
                params![note_id, user_id, email],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(existing) = duplicate {
            return Err(StoreError::DuplicateCollaborator { who: existing });
        }

        let now = Utc::now();
        conn.execute(
            "INSERT INTO collaborators (note_id, user_id, email, display_name, permission, joined_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                note_id,
                user_id,
                email,
                req.display_name,
                req.permission.as_str(),
                now.to_rfc3339(),
            ],
        )?;
        notes::touch_note(&conn, note_id)?;

        Ok(Collaborator {
            user_id,
            email,
            display_name: req.display_name.clone(),
            permission: req.permission,
            joined_at: now,
        })
    }

    /// Remove a collaborator. Owner-only. Succeeds whether or not the user
    /// was present; returns whether a row was actually removed.
    pub fn remove_collaborator(
        &self,
        caller: &str,
        note_id: &str,
        user_id: &str,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::ManageSharing)?;

        let removed = conn.execute(
            "DELETE FROM collaborators WHERE note_id = ?1 AND user_id = ?2",
            params![note_id, user_id],
        )?;
        if removed > 0 {
            notes::touch_note(&conn, note_id)?;
        }

        Ok(removed > 0)
    }

    /// Change a collaborator's permission. Owner-only. A no-op that still
    /// reports success when the user is not on the note.
    pub fn update_collaborator_permission(
        &self,
        caller: &str,
        note_id: &str,
        user_id: &str,
        permission: Permission,
    ) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::ManageSharing)?;

        let changed = conn.execute(
            "UPDATE collaborators SET permission = ?1 WHERE note_id = ?2 AND user_id = ?3",
            params![permission.as_str(), note_id, user_id],
        )?;
        if changed > 0 {
            notes::touch_note(&conn, note_id)?;
        }

        Ok(changed > 0)
    }

    /// Collaborators of a note in invitation order. Owner or collaborator.
    pub fn list_collaborators(&self, caller: &str, note_id: &str) -> StoreResult<Vec<Collaborator>> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::Read)?;

        Ok(load_collaborators(&conn, note_id)?)
    }

    /// Mint a fresh share token for a note, replacing (and thereby
    /// invalidating) any previous one. Owner-only.
    pub fn generate_share_token(&self, caller: &str, note_id: &str) -> StoreResult<String> {
        let conn = self.conn.lock().unwrap();
        access::check(&conn, caller, note_id, Action::ManageSharing)?;

        let mut buf = [0u8; 32];
        rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut buf);
        let token = hex::encode(buf);

        let updated = conn
            .execute(
                "UPDATE notes SET sharing_token = ?1, updated_at = ?2 WHERE id = ?3",
                params![token, Utc::now().to_rfc3339(), note_id],
            )
            .map_err(|e| StoreError::LinkGeneration(e.to_string()))?;
        if updated == 0 {
            return Err(StoreError::LinkGeneration(format!(
                "note {} disappeared during token write",
                note_id
            )));
        }

        Ok(token)
    }

    /// Whether the supplied token matches the note's stored token. False
    /// for an unknown note, a note that was never shared, or a mismatch.
    pub fn validate_share_token(&self, note_id: &str, token: &str) -> StoreResult<bool> {
        let conn = self.conn.lock().unwrap();

        let stored: Option<Option<String>> = conn
            .query_row(
                "SELECT sharing_token FROM notes WHERE id = ?1",
                [note_id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(matches!(stored, Some(Some(t)) if t == token))
    }
}

pub(crate) fn load_collaborators(
    conn: &Connection,
    note_id: &str,
) -> rusqlite::Result<Vec<Collaborator>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, email, display_name, permission, joined_at
         FROM collaborators WHERE note_id = ?1
         ORDER BY id",
    )?;

    stmt.query_map([note_id], |row| {
        let permission_str: String = row.get(3)?;
        let joined_at_str: String = row.get(4)?;

        Ok(Collaborator {
            user_id: row.get(0)?,
            email: row.get(1)?,
            display_name: row.get(2)?,
            permission: Permission::from_str(&permission_str).unwrap_or(Permission::View),
            joined_at: DateTime::parse_from_rfc3339(&joined_at_str)
                .unwrap()
                .with_timezone(&Utc),
        })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()
}
