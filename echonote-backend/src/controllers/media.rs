//! Audio upload and serving.
//!
//! Uploads land in the local media store under an opaque filename; the
//! returned URL is what goes into an entry's `audio_url`.

use actix_multipart::Multipart;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use futures_util::StreamExt;

use super::require_session;
use crate::config;
use crate::media::store::{is_allowed_audio, mime_for_ext, ALLOWED_EXTENSIONS};
use crate::AppState;

const MAX_AUDIO_SIZE: usize = 25 * 1024 * 1024; // 25MB

/// Accept a multipart audio upload and return its public URL
async fn upload_audio(
    data: web::Data<AppState>,
    req: HttpRequest,
    mut payload: Multipart,
) -> impl Responder {
    if let Err(resp) = require_session(&data, &req) {
        return resp;
    }

    let mut audio_data: Vec<u8> = Vec::new();
    let mut filename: Option<String> = None;

    while let Some(item) = payload.next().await {
        match item {
            Ok(mut field) => {
                let field_name = field.name().to_string();
                if field_name != "audio" {
                    continue;
                }

                filename = field
                    .content_disposition()
                    .get_filename()
                    .map(|s| s.to_string());

                while let Some(chunk) = field.next().await {
                    match chunk {
                        Ok(bytes) => {
                            audio_data.extend_from_slice(&bytes);
                            if audio_data.len() > MAX_AUDIO_SIZE {
                                return HttpResponse::PayloadTooLarge().json(serde_json::json!({
                                    "error": "Audio file exceeds 25MB limit"
                                }));
                            }
                        }
                        Err(e) => {
                            return HttpResponse::BadRequest().json(serde_json::json!({
                                "error": format!("Failed to read audio data: {}", e)
                            }));
                        }
                    }
                }
            }
            Err(e) => {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "error": format!("Failed to process multipart: {}", e)
                }));
            }
        }
    }

    if audio_data.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "No audio data provided"
        }));
    }

    let ext = filename
        .as_deref()
        .and_then(|f| f.rsplit('.').next())
        .map(|e| e.to_lowercase())
        .unwrap_or_else(|| "webm".to_string());
    if !ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": format!("Unsupported audio type .{}", ext)
        }));
    }

    match data.media.save(&audio_data, &ext) {
        Ok(stored) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "filename": stored,
            "url": config::media_url(&stored),
        })),
        Err(e) => {
            log::error!("Failed to store audio upload: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to store audio"
            }))
        }
    }
}

/// Serve a stored audio object
async fn serve_audio(data: web::Data<AppState>, path: web::Path<String>) -> HttpResponse {
    let filename = path.into_inner();

    if !is_allowed_audio(&filename) {
        return HttpResponse::Forbidden().json(serde_json::json!({
            "error": "Only audio files are served from /media/"
        }));
    }

    let file_path = match data.media.resolve(&filename) {
        Some(p) => p,
        None => {
            return HttpResponse::NotFound().json(serde_json::json!({
                "error": "File not found"
            }));
        }
    };

    match tokio::fs::read(&file_path).await {
        Ok(contents) => {
            let ext = filename.rsplit('.').next().unwrap_or("").to_lowercase();
            HttpResponse::Ok()
                .content_type(mime_for_ext(&ext))
                .append_header(("Cache-Control", "public, max-age=300"))
                .body(contents)
        }
        Err(_) => HttpResponse::NotFound().json(serde_json::json!({
            "error": "File not found"
        })),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/api/media").route("/audio", web::post().to(upload_audio)));
    cfg.service(web::scope("/media").route("/{filename}", web::get().to(serve_audio)));
}
