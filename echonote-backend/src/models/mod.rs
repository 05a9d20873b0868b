pub mod collaborator;
pub mod note;
pub mod note_entry;
pub mod session;

pub use collaborator::{
    email_user_id, Collaborator, InviteCollaboratorRequest, Permission, UpdatePermissionRequest,
};
pub use note::{CreateNoteRequest, Note, NoteDetail, SharedNoteView, UpdateNoteRequest};
pub use note_entry::{CreateEntryRequest, NoteEntry, UpdateEntryRequest};
pub use session::{CreateSessionRequest, Session};
