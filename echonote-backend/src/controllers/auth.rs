//! Session endpoints.
//!
//! The service does not authenticate users itself; `POST /api/auth/session`
//! mints a bearer session for an identity the upstream provider has already
//! asserted. When `IDENTITY_GATE_SECRET` is configured the mint endpoint
//! additionally requires it in the `X-Identity-Gate` header.

use actix_web::{web, HttpRequest, HttpResponse, Responder};

use super::require_session;
use crate::models::CreateSessionRequest;
use crate::AppState;

/// Mint a session for an asserted identity
async fn create_session(
    data: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateSessionRequest>,
) -> impl Responder {
    if let Some(secret) = &data.config.identity_gate_secret {
        let presented = req
            .headers()
            .get("X-Identity-Gate")
            .and_then(|h| h.to_str().ok());
        if presented != Some(secret.as_str()) {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "Identity gate secret missing or incorrect"
            }));
        }
    }

    let user_id = body.user_id.trim();
    if user_id.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "user_id must not be empty"
        }));
    }

    match data.db.create_session(user_id, body.display_name.as_deref()) {
        Ok(session) => HttpResponse::Ok().json(session),
        Err(e) => {
            log::error!("Failed to create session: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Delete the presented session (logout)
async fn delete_session(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .map(|s| s.trim_start_matches("Bearer ").to_string());

    let token = match token {
        Some(t) => t,
        None => {
            return HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "No authorization token provided"
            }));
        }
    };

    match data.db.delete_session(&token) {
        Ok(deleted) => HttpResponse::Ok().json(serde_json::json!({ "success": deleted })),
        Err(e) => {
            log::error!("Failed to delete session: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": format!("Database error: {}", e)
            }))
        }
    }
}

/// Current caller identity
async fn me(data: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let session = match require_session(&data, &req) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    HttpResponse::Ok().json(serde_json::json!({
        "user_id": session.user_id,
        "display_name": session.display_name,
        "expires_at": session.expires_at,
    }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/auth")
            .route("/session", web::post().to(create_session))
            .route("/session", web::delete().to(delete_session))
            .route("/me", web::get().to(me)),
    );
}
