//! Error types for the note storage layer and collaborator registry.

use thiserror::Error;

/// Failures surfaced by the storage layer.
///
/// Registry operations return this enum instead of a bare boolean so the
/// HTTP layer can tell "note missing" from "duplicate invite" from "backend
/// write failed" and answer with the right status code.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Referenced note or entry does not exist.
    #[error("not found: {id}")]
    NotFound { id: String },

    /// Invite of a user id or email already present on the note.
    #[error("collaborator already present: {who}")]
    DuplicateCollaborator { who: String },

    /// The caller's identity does not satisfy the access policy.
    #[error("not permitted")]
    Unauthorized,

    /// Share-link generation could not persist the new token.
    #[error("failed to generate share link: {0}")]
    LinkGeneration(String),

    /// Malformed or incomplete request payload.
    #[error("invalid request: {message}")]
    InvalidInput { message: String },

    /// Underlying storage failure, including rejected writes.
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;
