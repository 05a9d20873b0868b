//! Notes REST API: note and entry CRUD for the web UI.
//!
//! Collaborator administration and share links live in the sharing
//! controller; its note-scoped routes are mounted into this scope.

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::{require_session, sharing, store_error_response};
use crate::models::{
    CreateEntryRequest, CreateNoteRequest, UpdateEntryRequest, UpdateNoteRequest,
};
use crate::AppState;

/// Create a note owned by the caller
async fn create_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateNoteRequest>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let title = body.title.trim();
    if title.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "title must not be empty"
        }));
    }

    match data.db.create_note(&session.user_id, title) {
        Ok(note) => HttpResponse::Created().json(note),
        Err(e) => store_error_response(e),
    }
}

/// List notes the caller owns or collaborates on
async fn list_notes(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    match data.db.list_notes(&session.user_id) {
        Ok(mut notes) => {
            // The share token is owner-facing metadata
            for note in &mut notes {
                if note.owner_id != session.user_id {
                    note.sharing_token = None;
                }
            }
            HttpResponse::Ok().json(notes)
        }
        Err(e) => store_error_response(e),
    }
}

/// Fetch a note with its entries and collaborator set
async fn get_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.get_note_detail(&session.user_id, &note_id) {
        Ok(mut detail) => {
            if detail.note.owner_id != session.user_id {
                detail.note.sharing_token = None;
            }
            HttpResponse::Ok().json(detail)
        }
        Err(e) => store_error_response(e),
    }
}

/// Retitle a note
async fn update_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UpdateNoteRequest>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    let title = body.title.trim();
    if title.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "title must not be empty"
        }));
    }

    match data.db.update_note_title(&session.user_id, &note_id, title) {
        Ok(mut note) => {
            if note.owner_id != session.user_id {
                note.sharing_token = None;
            }
            HttpResponse::Ok().json(note)
        }
        Err(e) => store_error_response(e),
    }
}

/// Delete a note and everything in it
async fn delete_note(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.delete_note(&session.user_id, &note_id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => store_error_response(e),
    }
}

/// Append an entry to a note
async fn create_entry(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<CreateEntryRequest>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.create_entry(&session.user_id, &note_id, &body) {
        Ok(entry) => HttpResponse::Created().json(entry),
        Err(e) => store_error_response(e),
    }
}

/// Update an entry's content, audio pointer, or position
async fn update_entry(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<UpdateEntryRequest>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (note_id, entry_id) = path.into_inner();

    match data
        .db
        .update_entry(&session.user_id, &note_id, &entry_id, &body)
    {
        Ok(entry) => HttpResponse::Ok().json(entry),
        Err(e) => store_error_response(e),
    }
}

/// Delete an entry. Owner of the parent note only.
async fn delete_entry(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (note_id, entry_id) = path.into_inner();

    match data.db.delete_entry(&session.user_id, &note_id, &entry_id) {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({ "success": true })),
        Err(e) => store_error_response(e),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/notes")
            .configure(sharing::note_routes)
            .route("", web::post().to(create_note))
            .route("", web::get().to(list_notes))
            .route("/{id}", web::get().to(get_note))
            .route("/{id}", web::put().to(update_note))
            .route("/{id}", web::delete().to(delete_note))
            .route("/{id}/entries", web::post().to(create_entry))
            .route("/{id}/entries/{entry_id}", web::put().to(update_entry))
            .route("/{id}/entries/{entry_id}", web::delete().to(delete_entry)),
    );
}
