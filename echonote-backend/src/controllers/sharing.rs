//! Collaborator administration and link sharing.
//!
//! Collaborator and share-link routes are note-scoped and mounted into the
//! notes controller's scope via [`note_routes`]; the anonymous share view
//! has its own `/api/share` scope.

use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{require_session, store_error_response};
use crate::config;
use crate::errors::StoreError;
use crate::models::{InviteCollaboratorRequest, SharedNoteView, UpdatePermissionRequest};
use crate::AppState;

/// List a note's collaborators in invitation order
async fn list_collaborators(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.list_collaborators(&session.user_id, &note_id) {
        Ok(collaborators) => HttpResponse::Ok().json(collaborators),
        Err(e) => store_error_response(e),
    }
}

/// Invite a collaborator by user id or email
async fn invite_collaborator(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<InviteCollaboratorRequest>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data
        .db
        .invite_collaborator(&session.user_id, &note_id, &body)
    {
        Ok(collaborator) => HttpResponse::Created().json(collaborator),
        Err(e) => store_error_response(e),
    }
}

/// Change a collaborator's permission
async fn update_permission(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
    body: web::Json<UpdatePermissionRequest>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (note_id, user_id) = path.into_inner();

    match data.db.update_collaborator_permission(
        &session.user_id,
        &note_id,
        &user_id,
        body.permission,
    ) {
        Ok(changed) => {
            HttpResponse::Ok().json(serde_json::json!({ "success": true, "changed": changed }))
        }
        Err(e) => store_error_response(e),
    }
}

/// Remove a collaborator; succeeds even if they were not present
async fn remove_collaborator(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(String, String)>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let (note_id, user_id) = path.into_inner();

    match data
        .db
        .remove_collaborator(&session.user_id, &note_id, &user_id)
    {
        Ok(removed) => {
            HttpResponse::Ok().json(serde_json::json!({ "success": true, "removed": removed }))
        }
        Err(e) => store_error_response(e),
    }
}

/// Generate (or rotate) a note's share link. The previous token, if any,
/// stops validating.
async fn generate_share_link(
    data: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let note_id = path.into_inner();

    match data.db.generate_share_token(&session.user_id, &note_id) {
        Ok(token) => HttpResponse::Ok().json(serde_json::json!({
            "note_id": note_id,
            "token": token,
            "url": config::share_url(&note_id, &token),
        })),
        Err(e) => store_error_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ShareQuery {
    token: String,
}

/// Read-only view of a note through its share token. No session required;
/// the (note id, token) pair is the whole capability.
async fn shared_note_view(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ShareQuery>,
) -> impl Responder {
    let note_id = path.into_inner();

    match data.db.get_shared_note(&note_id, &query.token) {
        Ok((note, entries)) => HttpResponse::Ok().json(SharedNoteView {
            id: note.id,
            title: note.title,
            entries,
        }),
        Err(StoreError::Unauthorized) => HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Invalid share token"
        })),
        Err(e) => store_error_response(e),
    }
}

/// Note-scoped routes, mounted inside the `/api/notes` scope.
pub fn note_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{id}/collaborators", web::get().to(list_collaborators));
    cfg.route("/{id}/collaborators", web::post().to(invite_collaborator));
    cfg.route(
        "/{id}/collaborators/{user_id}",
        web::put().to(update_permission),
    );
    cfg.route(
        "/{id}/collaborators/{user_id}",
        web::delete().to(remove_collaborator),
    );
    cfg.route("/{id}/share", web::post().to(generate_share_link));
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/share").route("/{note_id}", web::get().to(shared_note_view)));
}
