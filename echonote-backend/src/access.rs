//! Storage-side authorization.
//!
//! Every note and entry access path runs [`check`] while holding the
//! database lock, so the policy is enforced at the storage boundary and a
//! client that skips the UI (or forges request bodies) is still blocked.
//! The caller identity is always an explicit parameter; there is no ambient
//! current-user state anywhere in the crate.

use rusqlite::{Connection, OptionalExtension};

use crate::errors::StoreError;
use crate::models::Permission;

/// What the caller is trying to do with a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Note/entry reads, collaborator listing.
    Read,
    /// Note retitle, entry create/update.
    Update,
    /// Note or entry deletion. Owner-only.
    Delete,
    /// Collaborator administration and share-link generation. Owner-only.
    ManageSharing,
}

/// Owner and caller-permission context for one note.
#[derive(Debug, Clone)]
pub struct NoteAccess {
    pub owner_id: String,
    pub caller_permission: Option<Permission>,
}

impl NoteAccess {
    /// Apply the policy rules table.
    pub fn allows(&self, caller: &str, action: Action) -> bool {
        if self.owner_id == caller {
            return true;
        }
        match action {
            Action::Read => self.caller_permission.is_some(),
            Action::Update => self.caller_permission == Some(Permission::Edit),
            Action::Delete | Action::ManageSharing => false,
        }
    }
}

/// Load the note's access context and authorize the caller.
///
/// Fails with `NotFound` when the note does not exist and `Unauthorized`
/// on a policy denial. Must be called with the connection lock already
/// held by the storage operation, so the decision and the mutation it
/// guards are atomic.
pub(crate) fn check(
    conn: &Connection,
    caller: &str,
    note_id: &str,
    action: Action,
) -> Result<(), StoreError> {
    let owner_id: Option<String> = conn
        .query_row("SELECT owner_id FROM notes WHERE id = ?1", [note_id], |row| {
            row.get(0)
        })
        .optional()?;

    let owner_id = owner_id.ok_or_else(|| StoreError::NotFound {
        id: note_id.to_string(),
    })?;

    let permission: Option<String> = conn
        .query_row(
            "SELECT permission FROM collaborators WHERE note_id = ?1 AND user_id = ?2",
            [note_id, caller],
            |row| row.get(0),
        )
        .optional()?;

    let access = NoteAccess {
        owner_id,
        caller_permission: permission.and_then(|p| Permission::from_str(&p)),
    };

    if access.allows(caller, action) {
        Ok(())
    } else {
        Err(StoreError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(owner: &str, perm: Option<Permission>) -> NoteAccess {
        NoteAccess {
            owner_id: owner.to_string(),
            caller_permission: perm,
        }
    }

    #[test]
    fn test_owner_allowed_everything() {
        let access = ctx("alice", None);
        for action in [
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::ManageSharing,
        ] {
            assert!(access.allows("alice", action));
        }
    }

    #[test]
    fn test_view_collaborator_read_only() {
        let access = ctx("alice", Some(Permission::View));
        assert!(access.allows("bob", Action::Read));
        assert!(!access.allows("bob", Action::Update));
        assert!(!access.allows("bob", Action::Delete));
        assert!(!access.allows("bob", Action::ManageSharing));
    }

    #[test]
    fn test_edit_collaborator_cannot_delete_or_manage() {
        let access = ctx("alice", Some(Permission::Edit));
        assert!(access.allows("bob", Action::Read));
        assert!(access.allows("bob", Action::Update));
        assert!(!access.allows("bob", Action::Delete));
        assert!(!access.allows("bob", Action::ManageSharing));
    }

    #[test]
    fn test_stranger_denied() {
        let access = ctx("alice", None);
        assert!(!access.allows("mallory", Action::Read));
        assert!(!access.allows("mallory", Action::Update));
        assert!(!access.allows("mallory", Action::Delete));
        assert!(!access.allows("mallory", Action::ManageSharing));
    }
}
