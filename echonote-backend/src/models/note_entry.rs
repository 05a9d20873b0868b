use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Single text or audio entry within a note
#[derive(Debug, Clone, Serialize)]
pub struct NoteEntry {
    pub id: String,
    pub note_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    /// Display sequence. Not unique; ties resolve by insertion order.
    pub entry_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to append an entry to a note.
///
/// At least one of `content` / `audio_url` is required. When `entry_order`
/// is omitted the entry lands after the current last one.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEntryRequest {
    pub content: Option<String>,
    pub audio_url: Option<String>,
    pub entry_order: Option<i64>,
}

/// Partial update of an entry; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEntryRequest {
    pub content: Option<String>,
    pub audio_url: Option<String>,
    pub entry_order: Option<i64>,
}
