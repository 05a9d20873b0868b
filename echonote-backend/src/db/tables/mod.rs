pub mod auth_sessions;
pub mod collaborators;
pub mod note_entries;
pub mod notes;
