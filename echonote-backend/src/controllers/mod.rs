pub mod auth;
pub mod health;
pub mod media;
pub mod notes;
pub mod sharing;
pub mod transcribe;

use actix_web::{web, HttpRequest, HttpResponse};

use crate::errors::StoreError;
use crate::models::Session;
use crate::AppState;

/// Resolve the caller identity from the request's bearer token.
pub(crate) fn require_session(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<Session, HttpResponse> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string());

    let token = match token {
        Some(t) => t,
        None => {
            return Err(HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "No authorization token provided"
            })));
        }
    };

    match state.db.validate_session(&token) {
        Ok(Some(session)) => Ok(session),
        Ok(None) => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "Invalid or expired session"
        }))),
        Err(e) => {
            log::error!("Session validation error: {}", e);
            Err(HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            })))
        }
    }
}

/// Map a storage failure onto the HTTP response shape.
pub(crate) fn store_error_response(err: StoreError) -> HttpResponse {
    match &err {
        StoreError::NotFound { .. } => {
            HttpResponse::NotFound().json(serde_json::json!({ "error": err.to_string() }))
        }
        StoreError::DuplicateCollaborator { .. } => {
            HttpResponse::Conflict().json(serde_json::json!({ "error": err.to_string() }))
        }
        StoreError::Unauthorized => {
            HttpResponse::Forbidden().json(serde_json::json!({ "error": err.to_string() }))
        }
        StoreError::InvalidInput { .. } => {
            HttpResponse::BadRequest().json(serde_json::json!({ "error": err.to_string() }))
        }
        StoreError::LinkGeneration(_) | StoreError::Sqlite(_) => {
            log::error!("Storage failure: {}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Internal server error"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{test, web, App};
    use std::sync::Arc;

    use crate::config::Config;
    use crate::db::Database;
    use crate::media::MediaStore;
    use crate::AppState;

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        AppState {
            db: Arc::new(Database::open_in_memory().unwrap()),
            config: Config {
                port: 0,
                database_url: ":memory:".to_string(),
                transcriber_url: None,
                identity_gate_secret: None,
            },
            media: Arc::new(MediaStore::new(dir.path().join("media")).unwrap()),
        }
    }

    #[actix_web::test]
    async fn test_note_routes_require_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(test_state(&dir)))
                .configure(super::notes::config),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/notes")
            .set_json(serde_json::json!({ "title": "Trip" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401);
    }

    #[actix_web::test]
    async fn test_note_share_flow_over_http() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(&dir);
        let db = Arc::clone(&state.db);
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(super::auth::config)
                .configure(super::notes::config)
                .configure(super::sharing::config),
        )
        .await;

        // Mint a session through the endpoint
        let req = test::TestRequest::post()
            .uri("/api/auth/session")
            .set_json(serde_json::json!({ "user_id": "alice", "display_name": "Alice" }))
            .to_request();
        let session: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let token = session["token"].as_str().unwrap().to_string();
        let bearer = format!("Bearer {}", token);

        // Create a note
        let req = test::TestRequest::post()
            .uri("/api/notes")
            .insert_header(("Authorization", bearer.clone()))
            .set_json(serde_json::json!({ "title": "Trip" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
        let note: serde_json::Value = test::read_body_json(resp).await;
        let note_id = note["id"].as_str().unwrap().to_string();

        // Invite bob, then a duplicate invite on the same email conflicts
        let req = test::TestRequest::post()
            .uri(&format!("/api/notes/{}/collaborators", note_id))
            .insert_header(("Authorization", bearer.clone()))
            .set_json(serde_json::json!({ "user_id": "bob", "email": "bob@x.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);

        let req = test::TestRequest::post()
            .uri(&format!("/api/notes/{}/collaborators", note_id))
            .insert_header(("Authorization", bearer.clone()))
            .set_json(serde_json::json!({ "user_id": "bob2", "email": "bob@x.com" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 409);

        // Generate a share link and read the note anonymously through it
        let req = test::TestRequest::post()
            .uri(&format!("/api/notes/{}/share", note_id))
            .insert_header(("Authorization", bearer.clone()))
            .to_request();
        let share: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let share_token = share["token"].as_str().unwrap().to_string();
        assert!(share["url"]
            .as_str()
            .unwrap()
            .contains(&format!("/share/{}?token=", note_id)));

        let req = test::TestRequest::get()
            .uri(&format!("/api/share/{}?token={}", note_id, share_token))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 200);

        let req = test::TestRequest::get()
            .uri(&format!("/api/share/{}?token=wrong", note_id))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 403);

        // The collaborator set is visible to the owner in the detail view
        let detail = db.get_note_detail("alice", &note_id).unwrap();
        assert_eq!(detail.collaborators.len(), 1);
        assert_eq!(detail.collaborators[0].user_id, "bob");
    }
}
