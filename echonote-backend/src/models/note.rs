use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Collaborator, NoteEntry};

/// Note - top-level container for ordered text/audio entries
#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub owner_id: String,
    /// Opaque link-sharing token; only serialized for the owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sharing_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a note
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
}

/// Request to retitle a note
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateNoteRequest {
    pub title: String,
}

/// Note with its entries and collaborator set, for the detail endpoint
#[derive(Debug, Clone, Serialize)]
pub struct NoteDetail {
    #[serde(flatten)]
    pub note: Note,
    pub entries: Vec<NoteEntry>,
    pub collaborators: Vec<Collaborator>,
}

/// Read-only view of a note reached through a share link
#[derive(Debug, Clone, Serialize)]
pub struct SharedNoteView {
    pub id: String,
    pub title: String,
    pub entries: Vec<NoteEntry>,
}
